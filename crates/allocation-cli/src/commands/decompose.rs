use allocation_core::decomposition::{self, DecompositionInput, RebalanceInput};
use allocation_core::Distribution;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

use super::{collect_pairs, envelope, parse_asset_value};
use crate::config::Settings;
use crate::input;
use crate::store;

/// Arguments for the base/active decomposition
#[derive(Args)]
pub struct DecomposeArgs {
    /// Path to JSON file with a DecompositionInput
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Person from the people file (name or 1-based index)
    #[arg(long)]
    pub person: Option<String>,

    /// Holding as ASSET=AMOUNT (repeatable)
    #[arg(long = "holding", value_parser = parse_asset_value)]
    pub holdings: Vec<(String, Decimal)>,

    /// Base allocation as ASSET=FRACTION of the overall principal (repeatable)
    #[arg(long = "base", value_parser = parse_asset_value)]
    pub base: Vec<(String, Decimal)>,
}

/// Arguments for a current to target rebalance plan
#[derive(Args)]
pub struct DiffArgs {
    /// Path to JSON file with a RebalanceInput
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Person from the people file (name or 1-based index)
    #[arg(long)]
    pub person: Option<String>,

    /// Principal override; defaults to the person's principal
    #[arg(long)]
    pub principal: Option<Decimal>,
}

pub fn run_decompose(args: DecomposeArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let decomposition_input: DecompositionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref selector) = args.person {
        let person = store::load_person(&settings.people, selector)?;
        DecompositionInput {
            holdings: person.current_holdings()?,
            base_percentages: person.base_portfolio_distribution.clone().unwrap_or_default(),
        }
    } else if !args.holdings.is_empty() {
        DecompositionInput {
            holdings: collect_pairs(&args.holdings),
            base_percentages: collect_pairs(&args.base),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --person, --holding/--base or pipe JSON via stdin".into());
    };

    let catalog = store::load_catalog(&settings.catalog)?;
    let result = decomposition::decompose_portfolio(&decomposition_input, &catalog.result)?;
    envelope(result, &catalog.warnings)
}

pub fn run_diff(args: DiffArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut rebalance_input: RebalanceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref selector) = args.person {
        let person = store::load_person(&settings.people, selector)?;
        let target: Distribution = person
            .target_portfolio
            .clone()
            .ok_or_else(|| format!("{} has no target portfolio", person.name))?;
        let principal = args
            .principal
            .or_else(|| person.resolved_principal())
            .ok_or_else(|| format!("{} has no principal recorded; pass --principal", person.name))?;
        RebalanceInput {
            principal,
            current: person.current_distribution()?,
            target,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --person or pipe JSON via stdin".into());
    };

    if let Some(principal) = args.principal {
        rebalance_input.principal = principal;
    }

    let result = decomposition::plan_rebalance(&rebalance_input)?;
    envelope(result, &[])
}
