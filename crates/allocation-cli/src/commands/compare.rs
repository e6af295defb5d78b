use allocation_core::comparison::{self, ComparisonInput};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use super::envelope;
use crate::config::Settings;
use crate::input;
use crate::store;

/// Arguments for the current / base / target comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON file with a ComparisonInput
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Person from the people file (name or 1-based index)
    #[arg(long)]
    pub person: Option<String>,
}

pub fn run_compare(args: CompareArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref selector) = args.person {
        let person = store::load_person(&settings.people, selector)?;
        ComparisonInput {
            principal: person
                .resolved_principal()
                .ok_or_else(|| format!("{} has no principal recorded", person.name))?,
            current: person.current_distribution()?,
            base: person.base_portfolio_distribution.clone().unwrap_or_default(),
            target: person
                .target_portfolio
                .clone()
                .ok_or_else(|| format!("{} has no target portfolio", person.name))?,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --person or pipe JSON via stdin".into());
    };

    let catalog = store::load_catalog(&settings.catalog)?;
    let result = comparison::compare_portfolios(&comparison_input, &catalog.result)?;
    envelope(result, &catalog.warnings)
}
