//! Service layer owning the database, the workflow registry, and the clock.
//!
//! `CirculationService` wraps `ShelfDb` (raw database access) together with the
//! collaborators every circulation operation needs. Repository and engine
//! methods are implemented as `impl CirculationService` blocks under `repos/`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shelf_config::ShelfConfig;
use shelf_core::clock::{Clock, SystemClock};
use shelf_core::due::LoanPeriod;
use shelf_core::errors::CoreError;
use shelf_core::workflow::{MANIFESTATION_WORKFLOW, Workflow, WorkflowRegistry};

use crate::ShelfDb;
use crate::error::DatabaseError;

/// Runs circulation operations against one database.
///
/// Every mutating operation follows this protocol:
/// 1. Open a session connection and `BEGIN IMMEDIATE`
/// 2. Read and write ledger rows, driving the holding workflow as it goes
/// 3. Commit, or roll back everything on the first error
pub struct CirculationService {
    db: ShelfDb,
    workflows: WorkflowRegistry,
    workflow_name: String,
    loan_period: LoanPeriod,
    clock: Arc<dyn Clock>,
}

impl CirculationService {
    /// Create a service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `workflows` - Registry that must contain the `manifestation` workflow.
    /// * `loan_period` - Lead time applied to every new loan.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        workflows: WorkflowRegistry,
        loan_period: LoanPeriod,
    ) -> Result<Self, DatabaseError> {
        let db = ShelfDb::open_local(db_path).await?;
        Ok(Self::from_db(db, workflows, loan_period))
    }

    /// Create a service from loaded configuration.
    ///
    /// The configured workflow is registered under its own name and becomes
    /// the one the engine drives.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &ShelfConfig) -> Result<Self, DatabaseError> {
        let db = ShelfDb::open_local_with_timeout(
            &config.database.path,
            Duration::from_millis(config.database.busy_timeout_ms),
        )
        .await?;
        let mut workflows = WorkflowRegistry::new();
        workflows.register(Arc::new(config.workflow.clone()));
        let mut service = Self::from_db(db, workflows, config.circulation.loan_period());
        service.workflow_name.clone_from(&config.workflow.name);
        Ok(service)
    }

    /// Create from an existing `ShelfDb` with the system clock.
    #[must_use]
    pub fn from_db(db: ShelfDb, workflows: WorkflowRegistry, loan_period: LoanPeriod) -> Self {
        Self {
            db,
            workflows,
            workflow_name: MANIFESTATION_WORKFLOW.to_string(),
            loan_period,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ShelfDb {
        &self.db
    }

    #[must_use]
    pub const fn loan_period(&self) -> LoanPeriod {
        self.loan_period
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The workflow that governs holdings.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the registry lacks it.
    pub fn workflow(&self) -> Result<Arc<dyn Workflow>, CoreError> {
        self.workflows.get(&self.workflow_name)
    }
}
