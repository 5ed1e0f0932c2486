use std::path::Path;

use anyhow::Context;
use ap2_core::credentials::{eligible, AccountStore};
use ap2_core::types::PaymentMethodData;
use serde_json::Value;

use super::super::args::EligibleArgs;
use crate::exit_codes::{FAILURE, SUCCESS};

pub fn run(args: EligibleArgs) -> anyhow::Result<i32> {
    let accounts = match &args.accounts {
        Some(path) => AccountStore::from_yaml_file(path)?,
        None => AccountStore::demo(),
    };
    if !accounts.contains(&args.account) {
        eprintln!("unknown account: {}", args.account);
        return Ok(FAILURE);
    }

    let criteria = read_criteria(&args.criteria)?;
    let aliases = eligible(accounts.payment_methods(&args.account), &criteria);
    tracing::info!(
        account = %args.account,
        criteria = criteria.len(),
        eligible = aliases.len(),
        "eligibility checked"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aliases)?);
    } else {
        for alias in &aliases {
            println!("{alias}");
        }
    }
    Ok(SUCCESS)
}

/// Accepts a single criterion object or an array of them.
pub fn read_criteria(path: &Path) -> anyhow::Result<Vec<PaymentMethodData>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read criteria file {}", path.display()))?;
    parse_criteria(&raw).with_context(|| format!("invalid criteria in {}", path.display()))
}

fn parse_criteria(raw: &str) -> anyhow::Result<Vec<PaymentMethodData>> {
    let value: Value = serde_json::from_str(raw)?;
    let criteria = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_criterion() {
        let criteria =
            parse_criteria(r#"{"supported_methods": "CARD", "data": {"network": ["amex"]}}"#)
                .unwrap();
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].supported_methods, "CARD");
    }

    #[test]
    fn test_parse_criteria_array() {
        let criteria = parse_criteria(
            r#"[{"supported_methods": "CARD", "data": {"network": ["visa"]}},
                {"supported_methods": "CARD", "data": {"network": ["amex"]}}]"#,
        )
        .unwrap();
        assert_eq!(criteria.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_criteria() {
        assert!(parse_criteria(r#"{"network": "amex"}"#).is_err());
        assert!(parse_criteria("not json").is_err());
    }

    #[test]
    fn test_read_criteria_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("criteria.json");
        std::fs::write(&path, r#"{"supported_methods": "CARD", "data": {"network": ["amex"]}}"#)
            .unwrap();
        let criteria = read_criteria(&path).unwrap();
        let aliases = eligible(
            AccountStore::demo().payment_methods("bugsbunny@gmail.com"),
            &criteria,
        );
        assert!(aliases.contains(&"American Express ending in 4444".to_string()));
    }
}
