use clap::Subcommand;

/// Circulation reports. `--limit` caps the rows (default from `general.default_limit`).
#[derive(Clone, Debug, Subcommand)]
pub enum ReportCommands {
    /// Most recent reservations.
    Reservations,
    /// Loans currently out.
    Loans,
    /// Most recently returned loans.
    Returns,
}
