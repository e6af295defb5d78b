use allocation_core::person::PersonRecord;
use allocation_core::valuation::{self, ValuationInput};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

use super::{collect_pairs, envelope, parse_asset_value};
use crate::config::Settings;
use crate::input;
use crate::store;

/// Which of a person's portfolios to value.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PortfolioKind {
    #[default]
    Current,
    Base,
    Target,
}

/// Arguments for a single-portfolio valuation
#[derive(Args)]
pub struct ValueArgs {
    /// Path to JSON file with a ValuationInput
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Person from the people file (name or 1-based index)
    #[arg(long)]
    pub person: Option<String>,

    /// Portfolio of the person to value
    #[arg(long, value_enum, default_value = "current")]
    pub portfolio: PortfolioKind,

    /// Holding as ASSET=AMOUNT (repeatable)
    #[arg(long = "holding", value_parser = parse_asset_value)]
    pub holdings: Vec<(String, Decimal)>,
}

fn person_portfolio(person: &PersonRecord, kind: PortfolioKind) -> Result<ValuationInput, Box<dyn std::error::Error>> {
    let principal = person.resolved_principal();
    let (label, distribution) = match kind {
        PortfolioKind::Current => {
            return Ok(ValuationInput {
                label: Some(format!("{} current", person.name)),
                holdings: Some(person.current_holdings()?),
                ..Default::default()
            });
        }
        PortfolioKind::Base => ("base", person.base_portfolio_distribution.clone()),
        PortfolioKind::Target => ("target", person.target_portfolio.clone()),
    };
    let distribution = distribution.ok_or_else(|| format!("{} has no {} portfolio", person.name, label))?;
    let principal = principal.ok_or_else(|| format!("{} has no principal recorded", person.name))?;
    Ok(ValuationInput {
        label: Some(format!("{} {}", person.name, label)),
        holdings: None,
        principal: Some(principal),
        distribution: Some(distribution),
    })
}

pub fn run_value(args: ValueArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation_input: ValuationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref selector) = args.person {
        let person = store::load_person(&settings.people, selector)?;
        person_portfolio(&person, args.portfolio)?
    } else if !args.holdings.is_empty() {
        ValuationInput {
            holdings: Some(collect_pairs(&args.holdings)),
            ..Default::default()
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --person, --holding or pipe JSON via stdin".into());
    };

    let catalog = store::load_catalog(&settings.catalog)?;
    let result = valuation::value_portfolio(&valuation_input, &catalog.result)?;
    envelope(result, &catalog.warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn person() -> PersonRecord {
        let mut p = PersonRecord::new("Ayşe");
        p.principal = Some(dec!(1000));
        p.target_portfolio = Some([("Gold".to_string(), dec!(1))].into_iter().collect());
        p
    }

    #[test]
    fn test_target_portfolio_uses_principal() {
        let input = person_portfolio(&person(), PortfolioKind::Target).unwrap();
        assert_eq!(input.principal, Some(dec!(1000)));
        assert_eq!(input.label.as_deref(), Some("Ayşe target"));
    }

    #[test]
    fn test_missing_base_portfolio_is_error() {
        let err = person_portfolio(&person(), PortfolioKind::Base).unwrap_err();
        assert!(err.to_string().contains("no base portfolio"));
    }
}
