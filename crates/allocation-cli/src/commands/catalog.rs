use allocation_core::{with_metadata, Rate, Scenario};
use allocation_core::valuation::effective_return;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::envelope;
use crate::config::Settings;
use crate::store;

#[derive(Debug, Serialize)]
struct CatalogRow {
    asset: String,
    risk_score: Decimal,
    bad: Rate,
    base: Rate,
    good: Rate,
    is_currency_coupled: bool,
    is_currency_reference: bool,
    /// Base-scenario return after currency coupling.
    effective_base_return: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Show the resolved catalog, legacy aliases and defaults applied.
pub fn run_catalog(settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = store::load_catalog(&settings.catalog)?;
    let catalog = &loaded.result;

    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|(key, asset)| CatalogRow {
            asset: key.clone(),
            risk_score: asset.risk_score,
            bad: asset.expected_return.bad,
            base: asset.expected_return.base,
            good: asset.expected_return.good,
            is_currency_coupled: asset.is_currency_coupled,
            is_currency_reference: catalog.is_currency_reference(key),
            effective_base_return: effective_return(catalog, key, Scenario::Base),
            description: asset.description.clone(),
        })
        .collect();

    let output = with_metadata(
        &loaded.methodology,
        &loaded.assumptions,
        Vec::new(),
        loaded.metadata.computation_time_us,
        serde_json::json!({
            "currency_reference": catalog.currency_reference(),
            "assets": rows,
        }),
    );
    envelope(output, &loaded.warnings)
}
