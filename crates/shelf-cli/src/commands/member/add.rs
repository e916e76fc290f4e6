use anyhow::Context;
use chrono::NaiveDate;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    identifier: &str,
    name: &str,
    expiry: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let expiry = expiry.map(parse_expiry).transpose()?;
    let member = ctx.service.register_member(identifier, name, expiry).await?;
    output(&member, flags.format)
}

fn parse_expiry(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid --expiry '{value}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::parse_expiry;

    #[test]
    fn expiry_must_be_a_calendar_date() {
        assert_eq!(
            parse_expiry("2027-03-31").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2027, 3, 31).unwrap()
        );
        assert!(parse_expiry("31/03/2027").is_err());
    }
}
