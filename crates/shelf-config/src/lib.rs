//! # shelf-config
//!
//! Layered configuration loading for Shelf using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SHELF_*` prefix, `__` as separator)
//! 2. Project-level `.shelf/config.toml`
//! 3. User-level `~/.config/shelf/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SHELF_CIRCULATION__DUE_DAYS` -> `circulation.due_days`,
//! `SHELF_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use shelf_config::ShelfConfig;
//!
//! let config = ShelfConfig::load_with_dotenv().expect("config");
//! println!("loan period: {:?}", config.circulation.loan_period());
//! ```

mod circulation;
mod database;
mod error;
mod general;
mod server;

pub use circulation::CirculationConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use shelf_core::workflow::WorkflowDefinition;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
    /// Status workflow for holdings, as data.
    #[serde(default)]
    pub workflow: WorkflowDefinition,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ShelfConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".shelf/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SHELF_").split("__"))
    }

    /// Reject values that extract cleanly but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workflow
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                field: "workflow".to_string(),
                reason: e.to_string(),
            })?;
        shelf_core::due::check_due_days(self.circulation.due_days).map_err(|reason| {
            ConfigError::InvalidValue {
                field: "circulation.due_days".to_string(),
                reason,
            }
        })?;
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shelf").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::due::LoanPeriod;

    #[test]
    fn default_config_loads() {
        let config = ShelfConfig::default();
        assert_eq!(config.database.path, ".shelf/shelf.db");
        assert_eq!(config.circulation.loan_period(), LoanPeriod::Unlimited);
        assert_eq!(config.workflow.name, "manifestation");
        config.validate().unwrap();
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = ShelfConfig::figment();
        let config: ShelfConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.general.default_limit, 50);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn overlong_due_days_are_rejected() {
        let mut config = ShelfConfig::default();
        config.circulation.due_days = Some(i64::from(u32::MAX));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "circulation.due_days"
        ));

        config.circulation.due_days = Some(21);
        config.validate().unwrap();
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut config = ShelfConfig::default();
        config.general.default_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "general.default_limit"
        ));
    }
}
