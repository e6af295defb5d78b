//! Side-by-side comparison of the current, base and target portfolios.
//!
//! All three breakdowns are expressed against the same overall principal so
//! they can be read across a single row. Scenario end values for the base
//! portfolio are also computed on the overall principal, which makes them a
//! like-for-like comparison rather than the base sub-portfolio's own value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::catalog::AssetCatalog;
use crate::decomposition::diff;
use crate::distribution::{check_sums_to_one, fraction_sum};
use crate::error::AllocationError;
use crate::types::*;
use crate::valuation::{weighted_return, weighted_risk};
use crate::AllocationResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub principal: Money,
    pub current: Distribution,
    /// Long-horizon base allocation; empty when the person has none.
    #[serde(default)]
    pub base: Distribution,
    pub target: Distribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub asset: AssetKey,
    pub current_fraction: Rate,
    pub current_amount: Money,
    pub base_fraction: Rate,
    pub base_amount: Money,
    pub target_fraction: Rate,
    pub target_amount: Money,
    /// Buy (+) / sell (-) to reach the target; `None` below the noise floor.
    pub change: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioFigures {
    pub expected_return: Rate,
    pub projected_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonScenario {
    pub scenario: Scenario,
    pub current: PortfolioFigures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<PortfolioFigures>,
    pub target: PortfolioFigures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub principal: Money,
    /// principal × Σ base fractions.
    pub base_principal: Money,
    pub rows: Vec<ComparisonRow>,
    pub current_risk: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_risk: Option<Decimal>,
    pub target_risk: Decimal,
    pub scenarios: Vec<ComparisonScenario>,
}

fn figures(principal: Money, dist: &Distribution, catalog: &AssetCatalog, scenario: Scenario, warnings: &mut Vec<String>) -> PortfolioFigures {
    let expected_return = weighted_return(dist, catalog, scenario).take(warnings);
    PortfolioFigures {
        expected_return,
        projected_value: principal * (Decimal::ONE + expected_return),
    }
}

/// Build the comparison report.
pub fn compare_portfolios(
    input: &ComparisonInput,
    catalog: &AssetCatalog,
) -> AllocationResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal.is_zero() {
        return Err(AllocationError::ZeroPrincipal {
            context: "portfolio comparison".into(),
        });
    }
    if input.target.is_empty() {
        return Err(AllocationError::InsufficientData(
            "Target distribution is required for a comparison".into(),
        ));
    }

    check_sums_to_one("Current", &input.current, &mut warnings);
    check_sums_to_one("Target", &input.target, &mut warnings);
    let has_base = !input.base.is_empty();

    let principal = input.principal;
    let changes = diff(&input.current, &input.target, principal);
    let assets: BTreeSet<&AssetKey> = input
        .current
        .keys()
        .chain(input.base.keys())
        .chain(input.target.keys())
        .collect();

    let rows = assets
        .into_iter()
        .map(|asset| {
            let current_fraction = input.current.get(asset).copied().unwrap_or(Decimal::ZERO);
            let base_fraction = input.base.get(asset).copied().unwrap_or(Decimal::ZERO);
            let target_fraction = input.target.get(asset).copied().unwrap_or(Decimal::ZERO);
            ComparisonRow {
                asset: asset.clone(),
                current_fraction,
                current_amount: current_fraction * principal,
                base_fraction,
                base_amount: base_fraction * principal,
                target_fraction,
                target_amount: target_fraction * principal,
                change: changes.get(asset).copied(),
            }
        })
        .collect();

    let current_risk = weighted_risk(&input.current, catalog).take(&mut warnings);
    let base_risk = has_base.then(|| weighted_risk(&input.base, catalog).take(&mut warnings));
    let target_risk = weighted_risk(&input.target, catalog).take(&mut warnings);

    let scenarios = Scenario::ALL
        .iter()
        .map(|&scenario| ComparisonScenario {
            scenario,
            current: figures(principal, &input.current, catalog, scenario, &mut warnings),
            base: has_base.then(|| figures(principal, &input.base, catalog, scenario, &mut warnings)),
            target: figures(principal, &input.target, catalog, scenario, &mut warnings),
        })
        .collect();

    let output = ComparisonOutput {
        principal,
        base_principal: principal * fraction_sum(&input.base),
        rows,
        current_risk,
        base_risk,
        target_risk,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Current / base / target comparison on a common principal",
        &serde_json::json!({
            "principal": principal.to_string(),
            "has_base": has_base,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Asset;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn catalog() -> AssetCatalog {
        let mut assets = BTreeMap::new();
        for (key, risk, base) in [("Cash", dec!(1), dec!(0.40)), ("Stocks", dec!(7), dec!(0.10))] {
            assets.insert(
                key.to_string(),
                Asset {
                    risk_score: risk,
                    expected_return: ScenarioReturns { bad: base, base, good: base },
                    is_currency_coupled: key == "Stocks",
                    description: None,
                },
            );
        }
        assets.insert(
            "USD".to_string(),
            Asset {
                risk_score: dec!(2),
                expected_return: ScenarioReturns { bad: dec!(0.3), base: dec!(0.2), good: dec!(0.1) },
                is_currency_coupled: true,
                description: None,
            },
        );
        AssetCatalog::new(assets, Some("USD".into()))
    }

    fn dist(pairs: &[(&str, Decimal)]) -> Distribution {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_comparison_rows_and_totals() {
        let input = ComparisonInput {
            principal: dec!(100000),
            current: dist(&[("Cash", dec!(0.8)), ("Stocks", dec!(0.2))]),
            base: dist(&[("Stocks", dec!(0.3))]),
            target: dist(&[("Cash", dec!(0.5)), ("Stocks", dec!(0.5))]),
        };
        let out = compare_portfolios(&input, &catalog()).unwrap();
        let res = &out.result;
        assert_eq!(res.base_principal, dec!(30000));
        assert_eq!(res.rows.len(), 2);
        assert_eq!(res.rows[0].asset, "Cash");
        assert_eq!(res.rows[0].change, Some(dec!(-30000)));
        assert_eq!(res.rows[1].base_amount, dec!(30000));
        assert_eq!(res.current_risk, dec!(2.2));
        assert_eq!(res.base_risk, Some(dec!(2.1)));
        assert_eq!(res.target_risk, dec!(4));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_comparison_scenarios_use_common_principal() {
        let input = ComparisonInput {
            principal: dec!(1000),
            current: dist(&[("Cash", dec!(1))]),
            base: Distribution::new(),
            target: dist(&[("Stocks", dec!(1))]),
        };
        let out = compare_portfolios(&input, &catalog()).unwrap();
        let base_row = &out.result.scenarios[1];
        assert_eq!(base_row.scenario, Scenario::Base);
        assert_eq!(base_row.current.projected_value, dec!(1400));
        // 1.1 * 1.2 - 1
        assert_eq!(base_row.target.expected_return, dec!(0.32));
        assert!(base_row.base.is_none());
        assert!(out.result.base_risk.is_none());
    }

    #[test]
    fn test_comparison_requires_target() {
        let input = ComparisonInput {
            principal: dec!(1000),
            current: dist(&[("Cash", dec!(1))]),
            base: Distribution::new(),
            target: Distribution::new(),
        };
        assert!(compare_portfolios(&input, &catalog()).is_err());
    }
}
