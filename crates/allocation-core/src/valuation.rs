//! Weighted risk and scenario returns over a distribution.
//!
//! Returns of currency-coupled assets are quoted in the foreign currency and
//! are compounded with the reference currency's expected appreciation:
//!
//! ```text
//! combined = (1 + r_asset) * (1 + r_currency) - 1
//! ```
//!
//! The reference asset itself already *is* the currency move, so it
//! contributes `r_currency` once and is never compounded with itself.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::AssetCatalog;
use crate::distribution::{self, check_sums_to_one};
use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

// ---------------------------------------------------------------------------
// Core weighted sums
// ---------------------------------------------------------------------------

pub(crate) fn unknown_asset_warning(asset: &str) -> String {
    format!("Asset '{asset}' not found in catalog; excluded from risk and return")
}

/// Return of a single asset under `scenario`, grossed up for currency
/// coupling. `None` when the asset is not catalogued.
pub fn effective_return(catalog: &AssetCatalog, asset: &str, scenario: Scenario) -> Option<Rate> {
    let info = catalog.lookup(asset)?;
    let currency_return = catalog.reference_return(scenario);
    let own = info.expected_return.get(scenario);

    let value = if catalog.is_currency_reference(asset) {
        currency_return
    } else if info.is_currency_coupled {
        (Decimal::ONE + own) * (Decimal::ONE + currency_return) - Decimal::ONE
    } else {
        own
    };
    Some(value)
}

/// Σ fraction × risk score over catalogued assets.
pub fn weighted_risk(distribution: &Distribution, catalog: &AssetCatalog) -> Assessed<Decimal> {
    let mut warnings = Vec::new();
    let mut total = Decimal::ZERO;
    for (asset, fraction) in distribution {
        match catalog.lookup(asset) {
            Some(info) => total += fraction * info.risk_score,
            None => warnings.push(unknown_asset_warning(asset)),
        }
    }
    Assessed::new(total, warnings)
}

/// Σ fraction × effective return under `scenario`.
pub fn weighted_return(
    distribution: &Distribution,
    catalog: &AssetCatalog,
    scenario: Scenario,
) -> Assessed<Rate> {
    let mut warnings = Vec::new();
    let mut total = Decimal::ZERO;
    for (asset, fraction) in distribution {
        match effective_return(catalog, asset, scenario) {
            Some(r) => total += fraction * r,
            None => warnings.push(unknown_asset_warning(asset)),
        }
    }
    Assessed::new(total, warnings)
}

/// `principal * (1 + weighted_return)`.
pub fn projected_value(
    principal: Money,
    distribution: &Distribution,
    catalog: &AssetCatalog,
    scenario: Scenario,
) -> Assessed<Money> {
    let r = weighted_return(distribution, catalog, scenario);
    Assessed::new(principal * (Decimal::ONE + r.value), r.warnings)
}

/// Expected return and end value of a portfolio under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub expected_return: Rate,
    pub projected_value: Money,
}

/// Bad, base and good projections for one portfolio.
pub fn scenario_projections(
    principal: Money,
    distribution: &Distribution,
    catalog: &AssetCatalog,
) -> Assessed<Vec<ScenarioProjection>> {
    let mut warnings = Vec::new();
    let rows = Scenario::ALL
        .iter()
        .map(|&scenario| {
            let expected_return = weighted_return(distribution, catalog, scenario).take(&mut warnings);
            ScenarioProjection {
                scenario,
                expected_return,
                projected_value: principal * (Decimal::ONE + expected_return),
            }
        })
        .collect();
    Assessed::new(rows, warnings)
}

// ---------------------------------------------------------------------------
// Portfolio valuation report
// ---------------------------------------------------------------------------

/// A portfolio given either as monetary holdings or as principal + fractions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Display name (e.g. "Current Portfolio").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Amount per asset. Takes precedence over `principal` + `distribution`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Holdings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

/// One asset line of the valuation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionValuation {
    pub asset: AssetKey,
    pub amount: Money,
    pub fraction: Rate,
    /// `None` when the asset is not catalogued.
    pub risk_score: Option<Decimal>,
    /// Base-scenario return after currency coupling.
    pub expected_return: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Output of a single-portfolio valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub principal: Money,
    /// Largest position first.
    pub positions: Vec<PositionValuation>,
    pub fraction_sum: Rate,
    pub sums_to_one: bool,
    /// Weighted average risk on the 0-10 scale.
    pub weighted_risk: Decimal,
    pub scenarios: Vec<ScenarioProjection>,
}

/// Value one portfolio: positions, weighted risk and all scenario projections.
pub fn value_portfolio(
    input: &ValuationInput,
    catalog: &AssetCatalog,
) -> AllocationResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (principal, holdings, dist) = match (&input.holdings, input.principal, &input.distribution) {
        (Some(holdings), _, _) => {
            let dist = distribution::normalize(holdings)?;
            (distribution::principal(holdings)?, holdings.clone(), dist)
        }
        (None, Some(principal), Some(dist)) => {
            if principal.is_zero() {
                return Err(AllocationError::ZeroPrincipal {
                    context: "portfolio valuation".into(),
                });
            }
            (principal, distribution::to_holdings(principal, dist)?, dist.clone())
        }
        _ => {
            return Err(AllocationError::InvalidInput {
                field: "holdings".into(),
                reason: "Provide holdings, or principal together with distribution".into(),
            });
        }
    };

    let label = input.label.as_deref().unwrap_or("Portfolio");
    let sums_to_one = check_sums_to_one(label, &dist, &mut warnings);

    let mut positions: Vec<PositionValuation> = holdings
        .iter()
        .map(|(asset, amount)| {
            let info = catalog.lookup(asset);
            PositionValuation {
                asset: asset.clone(),
                amount: *amount,
                fraction: dist.get(asset).copied().unwrap_or(Decimal::ZERO),
                risk_score: info.map(|a| a.risk_score),
                expected_return: effective_return(catalog, asset, Scenario::Base),
                description: info.and_then(|a| a.description.clone()),
            }
        })
        .collect();
    positions.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.asset.cmp(&b.asset)));

    let risk = weighted_risk(&dist, catalog).take(&mut warnings);
    let scenarios = scenario_projections(principal, &dist, catalog).take(&mut warnings);

    let output = ValuationOutput {
        label: input.label.clone(),
        principal,
        positions,
        fraction_sum: distribution::fraction_sum(&dist),
        sums_to_one,
        weighted_risk: risk,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted risk and currency-coupled scenario returns",
        &serde_json::json!({
            "principal": principal.to_string(),
            "assets": output.positions.len(),
            "currency_reference": catalog.currency_reference(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
