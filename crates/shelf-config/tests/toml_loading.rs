//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use shelf_config::ShelfConfig;
use shelf_core::due::LoanPeriod;
use shelf_core::enums::Transition;

#[test]
fn loads_circulation_and_database_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/shelf/library.db"
busy_timeout_ms = 250

[circulation]
due_days = 21
"#,
        )?;

        let config: ShelfConfig = Figment::from(Serialized::defaults(ShelfConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/shelf/library.db");
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.circulation.loan_period(), LoanPeriod::Days(21));
        Ok(())
    });
}

#[test]
fn sentinel_due_days_means_unlimited() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[circulation]\ndue_days = 9999\n")?;

        let config: ShelfConfig = Figment::from(Serialized::defaults(ShelfConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.circulation.due_days, Some(9999));
        assert_eq!(config.circulation.loan_period(), LoanPeriod::Unlimited);
        Ok(())
    });
}

#[test]
fn loads_custom_workflow_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[workflow]
name = "manifestation"
initial_place = "on_shelf"
places = ["on_shelf", "on_hold", "lent"]

[[workflow.transitions]]
name = "reserve"
from = ["on_shelf"]
to = "on_hold"

[[workflow.transitions]]
name = "check_out"
from = ["on_shelf", "on_hold"]
to = "lent"

[[workflow.transitions]]
name = "check_in"
from = ["lent"]
to = "on_shelf"
"#,
        )?;

        let config: ShelfConfig = Figment::from(Serialized::defaults(ShelfConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.workflow.initial_place, "on_shelf");
        assert_eq!(config.workflow.places, vec!["on_shelf", "on_hold", "lent"]);
        assert_eq!(config.workflow.transitions.len(), 3);
        assert_eq!(config.workflow.transitions[1].name, Transition::CheckOut);
        config.validate().expect("custom workflow should validate");
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".shelf")?;
        jail.create_file(".shelf/config.toml", "[general]\ndefault_limit = 5\n")?;

        let config = ShelfConfig::load().expect("config loads");
        assert_eq!(config.general.default_limit, 5);
        Ok(())
    });
}

#[test]
fn broken_workflow_fails_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".shelf")?;
        jail.create_file(
            ".shelf/config.toml",
            r#"
[workflow]
name = "manifestation"
initial_place = "available"
places = ["available"]
transitions = [{ name = "reserve", from = ["available"], to = "reserved" }]
"#,
        )?;

        let err = ShelfConfig::load().expect_err("undeclared place must be rejected");
        assert!(err.to_string().contains("reserved"), "{err}");
        Ok(())
    });
}
