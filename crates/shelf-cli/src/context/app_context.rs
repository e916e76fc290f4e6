use std::sync::Arc;

use anyhow::Context;
use shelf_config::ShelfConfig;
use shelf_db::service::CirculationService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<CirculationService>,
    pub config: ShelfConfig,
}

impl AppContext {
    /// Open the database and build the circulation service from configuration.
    pub async fn init(config: ShelfConfig) -> anyhow::Result<Self> {
        let service = CirculationService::from_config(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        tracing::debug!(
            path = %config.database.path,
            loan_period = ?service.loan_period(),
            "circulation service ready"
        );
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    /// Row limit for listings: `--limit`, else `general.default_limit`.
    #[must_use]
    pub fn limit(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.config.general.default_limit)
    }
}
