//! Entity structs for the Shelf circulation domain.
//!
//! Each entity maps to a table in the libSQL database (see
//! `shelf-db/migrations/`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON output and schema publication.

mod holding;
mod loan;
mod member;
mod reservation;

pub use holding::Holding;
pub use loan::{Loan, LoanView};
pub use member::Member;
pub use reservation::{Reservation, ReservationView};
