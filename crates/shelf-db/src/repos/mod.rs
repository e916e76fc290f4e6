//! Repository modules for the circulation domain.
//!
//! Each module exposes connection-level queries to the engine and adds public
//! methods to `CirculationService` via `impl CirculationService` blocks.
//! Connection-level functions take `&libsql::Connection` so the engine can run
//! them inside its transaction.

pub mod circulation;
pub mod holding;
pub mod loan;
pub mod member;
pub mod reservation;
