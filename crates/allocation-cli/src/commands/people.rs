use allocation_core::person::PersonRecord;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::store;

#[derive(Debug, Serialize)]
struct PersonSummary {
    index: usize,
    name: String,
    principal: Option<Decimal>,
    risk_score: Option<Decimal>,
    has_current: bool,
    has_base: bool,
    has_target: bool,
    updated_at: Option<DateTime<Utc>>,
}

fn summarize(index: usize, p: &PersonRecord) -> PersonSummary {
    PersonSummary {
        index,
        name: p.name.clone(),
        principal: p.resolved_principal(),
        risk_score: p.risk_score,
        has_current: p.current_portfolio_amount.is_some() || p.current_portfolio_distribution.is_some(),
        has_base: p.base_portfolio_distribution.is_some(),
        has_target: p.target_portfolio.is_some(),
        updated_at: p.updated_at,
    }
}

/// List people with the selector index used by `--person`.
pub fn run_people(settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let people = store::load_people(&settings.people)?;
    let rows: Vec<PersonSummary> = people
        .iter()
        .enumerate()
        .map(|(i, p)| summarize(i + 1, p))
        .collect();
    Ok(serde_json::to_value(rows)?)
}
