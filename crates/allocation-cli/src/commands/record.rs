use allocation_core::person::PersonRecord;
use allocation_core::valuation::{self, ValuationInput};
use allocation_core::Holdings;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

use super::{collect_pairs, envelope, parse_asset_value};
use crate::config::Settings;
use crate::input;
use crate::store;

/// Arguments for recording a person's current holdings
#[derive(Args)]
pub struct RecordArgs {
    /// Person from the people file (name or 1-based index)
    #[arg(long)]
    pub person: String,

    /// Path to JSON file with an ASSET -> AMOUNT map
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Holding as ASSET=AMOUNT (repeatable)
    #[arg(long = "holding", value_parser = parse_asset_value)]
    pub holdings: Vec<(String, Decimal)>,

    /// Add the person if not yet in the people file
    #[arg(long)]
    pub create: bool,
}

/// Replace the person's current portfolio, save, and report on it.
pub fn run_record_current(args: RecordArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let holdings: Holdings = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if !args.holdings.is_empty() {
        collect_pairs(&args.holdings)
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("Provide --input, --holding or pipe JSON via stdin".into());
    };
    if let Some((asset, amount)) = holdings.iter().find(|(_, a)| a.is_sign_negative()) {
        return Err(format!("Holding '{}' has a negative amount {}", asset, amount).into());
    }

    // The catalog must resolve before the people file is rewritten.
    let catalog = store::load_catalog(&settings.catalog)?;

    let mut people = store::load_people(&settings.people)?;
    let idx = match store::find_person(&people, &args.person) {
        Some(idx) => idx,
        None if args.create => {
            tracing::info!(person = %args.person, "adding person");
            people.push(PersonRecord::new(args.person.trim()));
            people.len() - 1
        }
        None => {
            return Err(format!(
                "No person '{}' in {}; pass --create to add one",
                args.person,
                settings.people.display()
            )
            .into())
        }
    };

    people[idx].record_current_holdings(holdings.clone(), Utc::now())?;
    store::save_people(&settings.people, &people)?;

    let report_input = ValuationInput {
        label: Some(format!("{} current", people[idx].name)),
        holdings: Some(holdings),
        ..Default::default()
    };
    let result = valuation::value_portfolio(&report_input, &catalog.result)?;
    envelope(result, &catalog.warnings)
}
