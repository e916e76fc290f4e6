use anyhow::Context;
use shelf_config::ShelfConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ShelfConfig> {
    let mut config = ShelfConfig::load_with_dotenv().context("failed to load configuration")?;
    apply_overrides(&mut config, flags);
    ensure_database_dir(&config)?;
    Ok(config)
}

fn apply_overrides(config: &mut ShelfConfig, flags: &GlobalFlags) {
    if let Some(path) = &flags.database {
        config.database.path.clone_from(path);
    }
}

/// Create the parent directory of a file database, e.g. `.shelf/`.
fn ensure_database_dir(config: &ShelfConfig) -> anyhow::Result<()> {
    if config.database.is_in_memory() {
        return Ok(());
    }
    let path = std::path::Path::new(&config.database.path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn flags(database: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            database: database.map(String::from),
        }
    }

    #[test]
    fn database_flag_overrides_config() {
        let mut config = ShelfConfig::default();
        apply_overrides(&mut config, &flags(Some(":memory:")));
        assert_eq!(config.database.path, ":memory:");
        ensure_database_dir(&config).unwrap();
    }

    #[test]
    fn no_flag_keeps_config_path() {
        let mut config = ShelfConfig::default();
        apply_overrides(&mut config, &flags(None));
        assert_eq!(config.database.path, ".shelf/shelf.db");
    }
}
