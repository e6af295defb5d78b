//! Base / active decomposition and allocation deltas.
//!
//! The base sub-portfolio is a fixed long-horizon allocation expressed as
//! fractions of the *overall* principal. Whatever remains per asset after
//! carving out the base is the active sub-portfolio. Active amounts are
//! signed: the base can ask for more of an asset than is currently held.
//!
//! Invariant: `base(a) + active(a) == overall(a)` exactly, for every asset.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::catalog::AssetCatalog;
use crate::distribution::{self, check_sums_to_one};
use crate::error::AllocationError;
use crate::types::*;
use crate::valuation::{scenario_projections, weighted_risk, ScenarioProjection};
use crate::AllocationResult;

/// Deltas at or below this many currency units are noise and dropped.
pub const DELTA_NOISE_FLOOR: Money = dec!(0.01);

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

/// Result of splitting overall holdings into base + active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub overall_principal: Money,
    /// Only assets named in the base percentages.
    pub base_holdings: Holdings,
    pub base_principal: Money,
    /// Union of overall and base assets; may be negative.
    pub active_holdings: Holdings,
    /// May be zero or negative.
    pub active_principal: Money,
    /// Active amounts relative to the active principal. Feeds valuation only;
    /// `None` when the active principal is zero.
    pub active_distribution: Option<Distribution>,
    /// Active amounts relative to the overall principal, for side-by-side
    /// display with the overall and base breakdowns. `None` when the overall
    /// principal is zero.
    pub active_display_fractions: Option<Distribution>,
}

/// Split `overall` into the base allocation and the signed residual.
///
/// Each base amount is `overall_principal × fraction`, rounded only as far as
/// needed for `base + active` to reproduce the held amount exactly.
pub fn decompose(overall: &Holdings, base_percentages: &Distribution) -> AllocationResult<Decomposition> {
    let overall_principal = distribution::principal(overall)?;

    let assets: BTreeSet<&AssetKey> = overall.keys().chain(base_percentages.keys()).collect();
    let mut base_holdings = Holdings::new();
    let mut active_holdings = Holdings::new();
    for asset in assets {
        let held = overall.get(asset).copied().unwrap_or(Decimal::ZERO);
        let active = match base_percentages.get(asset) {
            Some(fraction) => {
                let base = overall_principal
                    .checked_mul(*fraction)
                    .ok_or_else(|| AllocationError::overflow(format!("base_percentages.{asset}")))?;
                let (base, active) = split_exact(asset, held, base)?;
                base_holdings.insert(asset.clone(), base);
                active
            }
            None => held,
        };
        active_holdings.insert(asset.clone(), active);
    }

    let active_principal = distribution::principal(&active_holdings)?;
    let active_distribution = distribution::normalize(&active_holdings).ok();

    // checked_div is None for a zero overall principal.
    let active_display_fractions = active_holdings
        .iter()
        .map(|(asset, amount)| amount.checked_div(overall_principal).map(|f| (asset.clone(), f)))
        .collect::<Option<Distribution>>();

    Ok(Decomposition {
        overall_principal,
        base_principal: distribution::principal(&base_holdings)?,
        base_holdings,
        active_holdings,
        active_principal,
        active_distribution,
        active_display_fractions,
    })
}

/// Pair `(base, held - base)` whose sum is exactly `held`.
///
/// A subtraction across very different scales can round. The base is then
/// coarsened one decimal place at a time until the residual is exact.
fn split_exact(asset: &AssetKey, held: Money, base: Money) -> AllocationResult<(Money, Money)> {
    (0..=base.scale())
        .rev()
        .find_map(|dp| {
            let base = base.round_dp(dp);
            let active = held.checked_sub(base)?;
            (base.checked_add(active) == Some(held)).then_some((base, active))
        })
        .ok_or_else(|| AllocationError::InvalidInput {
            field: format!("base_percentages.{asset}"),
            reason: format!("base amount cannot be split exactly from the held amount {held}"),
        })
}

/// Per-asset sum of two sub-portfolios over the union of their assets.
pub fn recombine(base: &Holdings, active: &Holdings) -> Holdings {
    let mut total = base.clone();
    for (asset, amount) in active {
        *total.entry(asset.clone()).or_insert(Decimal::ZERO) += amount;
    }
    total
}

/// Signed monetary change per asset to move from `current` to `target`.
///
/// `delta(a) = (target(a) - current(a)) * principal`; deltas within
/// [`DELTA_NOISE_FLOOR`] of zero are omitted.
pub fn diff(current: &Distribution, target: &Distribution, principal: Money) -> BTreeMap<AssetKey, Money> {
    let assets: BTreeSet<&AssetKey> = current.keys().chain(target.keys()).collect();
    assets
        .into_iter()
        .filter_map(|asset| {
            let from = current.get(asset).copied().unwrap_or(Decimal::ZERO);
            let to = target.get(asset).copied().unwrap_or(Decimal::ZERO);
            let delta = (to - from) * principal;
            (delta.abs() > DELTA_NOISE_FLOOR).then(|| (asset.clone(), delta))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Decomposition report
// ---------------------------------------------------------------------------

/// Input for a base/active decomposition report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionInput {
    /// Current amount per asset.
    pub holdings: Holdings,
    /// Long-horizon base allocation as fractions of the overall principal.
    pub base_percentages: Distribution,
}

/// Risk and scenario returns of one sub-portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubPortfolioValuation {
    pub principal: Money,
    pub weighted_risk: Decimal,
    pub scenarios: Vec<ScenarioProjection>,
}

/// One asset row of the three-way breakdown, all fractions of the overall principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionRow {
    pub asset: AssetKey,
    pub overall_amount: Money,
    pub overall_fraction: Rate,
    pub base_amount: Money,
    pub base_fraction: Rate,
    pub active_amount: Money,
    pub active_fraction: Rate,
}

/// Output of the decomposition report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionOutput {
    pub decomposition: Decomposition,
    pub rows: Vec<DecompositionRow>,
    pub overall: SubPortfolioValuation,
    pub base: Option<SubPortfolioValuation>,
    /// Valued on the active distribution; absent with a zero active principal.
    pub active: Option<SubPortfolioValuation>,
}

fn value_sub_portfolio(principal: Money, dist: &Distribution, catalog: &AssetCatalog, warnings: &mut Vec<String>) -> SubPortfolioValuation {
    SubPortfolioValuation {
        principal,
        weighted_risk: weighted_risk(dist, catalog).take(warnings),
        scenarios: scenario_projections(principal, dist, catalog).take(warnings),
    }
}

/// Decompose holdings into base + active and value all three portfolios.
pub fn decompose_portfolio(
    input: &DecompositionInput,
    catalog: &AssetCatalog,
) -> AllocationResult<ComputationOutput<DecompositionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let overall_dist = distribution::normalize(&input.holdings)?;
    check_sums_to_one("Base", &input.base_percentages, &mut warnings);

    if let Some((asset, _)) = input.base_percentages.iter().find(|(_, f)| f.is_sign_negative()) {
        return Err(AllocationError::InvalidInput {
            field: format!("base_percentages.{asset}"),
            reason: "Base fractions must not be negative".into(),
        });
    }

    let split = decompose(&input.holdings, &input.base_percentages)?;
    let overall_principal = split.overall_principal;

    let overall = value_sub_portfolio(overall_principal, &overall_dist, catalog, &mut warnings);

    let base = match distribution::normalize(&split.base_holdings) {
        Ok(dist) => Some(value_sub_portfolio(split.base_principal, &dist, catalog, &mut warnings)),
        Err(_) => {
            warnings.push("Base allocation is empty; base portfolio not valued".into());
            None
        }
    };

    let active = match &split.active_distribution {
        Some(dist) => {
            if split.active_principal.is_sign_negative() {
                warnings.push(format!(
                    "Active principal is negative ({}); base allocation exceeds current holdings",
                    split.active_principal
                ));
            }
            Some(value_sub_portfolio(split.active_principal, dist, catalog, &mut warnings))
        }
        None => {
            warnings.push("Active principal is zero; active portfolio not valued".into());
            None
        }
    };

    let display = split.active_display_fractions.clone().unwrap_or_default();
    let rows = split
        .active_holdings
        .iter()
        .map(|(asset, active_amount)| {
            let overall_amount = input.holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
            let base_amount = split.base_holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
            DecompositionRow {
                asset: asset.clone(),
                overall_amount,
                overall_fraction: overall_dist.get(asset).copied().unwrap_or(Decimal::ZERO),
                base_amount,
                base_fraction: input.base_percentages.get(asset).copied().unwrap_or(Decimal::ZERO),
                active_amount: *active_amount,
                active_fraction: display.get(asset).copied().unwrap_or(Decimal::ZERO),
            }
        })
        .collect();

    let output = DecompositionOutput {
        decomposition: split,
        rows,
        overall,
        base,
        active,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Base/active decomposition (active = overall - base, signed)",
        &serde_json::json!({
            "overall_principal": overall_principal.to_string(),
            "base_assets": input.base_percentages.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Rebalance plan
// ---------------------------------------------------------------------------

/// Input for a current → target rebalance plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceInput {
    pub principal: Money,
    pub current: Distribution,
    pub target: Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One per-asset change in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationDelta {
    pub asset: AssetKey,
    pub action: TradeAction,
    pub current_fraction: Rate,
    pub target_fraction: Rate,
    pub fraction_change: Rate,
    /// Signed monetary change (positive = buy).
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceOutput {
    pub deltas: Vec<AllocationDelta>,
    pub total_buys: Money,
    pub total_sells: Money,
    /// Σ|amount| / 2 as a fraction of principal.
    pub one_way_turnover: Rate,
}

/// Buy/sell list moving `current` to `target` at the given principal.
pub fn plan_rebalance(input: &RebalanceInput) -> AllocationResult<ComputationOutput<RebalanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal.is_zero() {
        return Err(AllocationError::ZeroPrincipal {
            context: "rebalance plan".into(),
        });
    }
    check_sums_to_one("Current", &input.current, &mut warnings);
    check_sums_to_one("Target", &input.target, &mut warnings);

    let deltas: Vec<AllocationDelta> = diff(&input.current, &input.target, input.principal)
        .into_iter()
        .map(|(asset, amount)| {
            let current_fraction = input.current.get(&asset).copied().unwrap_or(Decimal::ZERO);
            let target_fraction = input.target.get(&asset).copied().unwrap_or(Decimal::ZERO);
            AllocationDelta {
                action: if amount.is_sign_positive() { TradeAction::Buy } else { TradeAction::Sell },
                asset,
                current_fraction,
                target_fraction,
                fraction_change: target_fraction - current_fraction,
                amount,
            }
        })
        .collect();

    let total_buys: Money = deltas.iter().filter(|d| d.action == TradeAction::Buy).map(|d| d.amount).sum();
    let total_sells: Money = deltas.iter().filter(|d| d.action == TradeAction::Sell).map(|d| -d.amount).sum();
    let one_way_turnover = (total_buys + total_sells) / dec!(2) / input.principal.abs();

    let output = RebalanceOutput {
        deltas,
        total_buys,
        total_sells,
        one_way_turnover,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Allocation delta (target - current) x principal, 0.01 noise floor",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "noise_floor": DELTA_NOISE_FLOOR.to_string(),
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

    fn map(pairs: &[(&str, Decimal)]) -> BTreeMap<AssetKey, Decimal> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn catalog() -> AssetCatalog {
        let mut assets = BTreeMap::new();
        for (key, risk, base) in [("A", dec!(2), dec!(0.10)), ("B", dec!(8), dec!(0.30))] {
            assets.insert(
                key.to_string(),
                Asset {
                    risk_score: risk,
                    expected_return: ScenarioReturns { bad: base, base, good: base },
                    is_currency_coupled: false,
                    description: None,
                },
            );
        }
        AssetCatalog::new(assets, None)
    }

    #[test]
    fn test_decompose_reference_case() {
        let overall = map(&[("A", dec!(300)), ("B", dec!(100))]);
        let base = map(&[("A", dec!(0.5))]);
        let d = decompose(&overall, &base).unwrap();
        assert_eq!(d.base_holdings, map(&[("A", dec!(200))]));
        assert_eq!(d.active_holdings, map(&[("A", dec!(100)), ("B", dec!(100))]));
        assert_eq!(d.active_principal, dec!(200));
        assert_eq!(d.active_distribution, Some(map(&[("A", dec!(0.5)), ("B", dec!(0.5))])));
        assert_eq!(
            d.active_display_fractions,
            Some(map(&[("A", dec!(0.25)), ("B", dec!(0.25))]))
        );
    }

    #[test]
    fn test_decompose_negative_active() {
        let overall = map(&[("A", dec!(100)), ("B", dec!(300))]);
        let base = map(&[("A", dec!(0.5)), ("C", dec!(0.1))]);
        let d = decompose(&overall, &base).unwrap();
        assert_eq!(d.active_holdings["A"], dec!(-100));
        assert_eq!(d.active_holdings["C"], dec!(-40));
        assert_eq!(d.active_principal, dec!(160));
        for asset in ["A", "B", "C"] {
            let held = overall.get(asset).copied().unwrap_or_default();
            let b = d.base_holdings.get(asset).copied().unwrap_or_default();
            assert_eq!(b + d.active_holdings[asset], held);
        }
    }

    #[test]
    fn test_decompose_zero_active_principal() {
        let overall = map(&[("A", dec!(100))]);
        let base = map(&[("A", dec!(1))]);
        let d = decompose(&overall, &base).unwrap();
        assert_eq!(d.active_principal, Decimal::ZERO);
        assert!(d.active_distribution.is_none());
    }

    #[test]
    fn test_decompose_split_is_exact_across_scales() {
        let overall = map(&[("A", dec!(9000000000)), ("B", dec!(1))]);
        let base = map(&[("A", dec!(0.0000000001234567890123456789))]);
        let d = decompose(&overall, &base).unwrap();
        for asset in ["A", "B"] {
            let b = d.base_holdings.get(asset).copied().unwrap_or_default();
            assert_eq!(b + d.active_holdings[asset], overall[asset]);
        }
        let unrounded = dec!(9000000001) * dec!(0.0000000001234567890123456789);
        assert!((d.base_holdings["A"] - unrounded).abs() < dec!(0.000000000000001));
    }

    #[test]
    fn test_decompose_unsplittable_scales_is_error() {
        let overall = map(&[("A", dec!(123456789.123456)), ("B", dec!(0.0000000000000000000001))]);
        let fraction = dec!(0.1234567890123456789012345678);
        let base = map(&[("A", fraction), ("B", Decimal::ONE - fraction)]);
        let err = decompose(&overall, &base).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput { ref field, .. } if field.starts_with("base_percentages.")));
    }

    #[test]
    fn test_decompose_overflowing_base_is_error() {
        let overall = map(&[("A", Decimal::MAX)]);
        let base = map(&[("A", dec!(2))]);
        let err = decompose(&overall, &base).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput { ref field, .. } if field == "base_percentages.A"));
    }

    #[test]
    fn test_recombine_restores_overall() {
        let overall = map(&[("A", dec!(300)), ("B", dec!(100))]);
        let base = map(&[("A", dec!(0.5)), ("C", dec!(0.25))]);
        let d = decompose(&overall, &base).unwrap();
        let back = recombine(&d.base_holdings, &d.active_holdings);
        assert_eq!(back["A"], dec!(300));
        assert_eq!(back["B"], dec!(100));
        assert_eq!(back["C"], Decimal::ZERO);
    }

    #[test]
    fn test_diff_noise_floor() {
        let current = map(&[("A", dec!(0.50)), ("B", dec!(0.50))]);
        let target = map(&[("A", dec!(0.500001)), ("B", dec!(0.499998)), ("C", dec!(0.000002))]);
        let d = diff(&current, &target, dec!(10000));
        // A: +0.01 (dropped), B: -0.02 (kept), C: +0.02 (kept)
        assert_eq!(d.len(), 2);
        assert_eq!(d["B"], dec!(-0.02));
        assert_eq!(d["C"], dec!(0.02));
    }

    #[test]
    fn test_decompose_portfolio_values_all_three() {
        let input = DecompositionInput {
            holdings: map(&[("A", dec!(300)), ("B", dec!(100))]),
            base_percentages: map(&[("A", dec!(0.5)), ("B", dec!(0.5))]),
        };
        let out = decompose_portfolio(&input, &catalog()).unwrap();
        let res = &out.result;
        // overall: 0.75*2 + 0.25*8
        assert_eq!(res.overall.weighted_risk, dec!(3.5));
        let base = res.base.as_ref().unwrap();
        assert_eq!(base.principal, dec!(400));
        assert_eq!(base.weighted_risk, dec!(5));
        // active: A +100, B -100 -> zero principal
        assert!(res.active.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("Active principal is zero")));
        assert_eq!(res.rows.len(), 2);
        assert_eq!(res.rows[1].active_amount, dec!(-100));
        assert_eq!(res.rows[1].active_fraction, dec!(-0.25));
    }

    #[test]
    fn test_decompose_portfolio_rejects_negative_base() {
        let input = DecompositionInput {
            holdings: map(&[("A", dec!(300))]),
            base_percentages: map(&[("A", dec!(-0.5))]),
        };
        assert!(decompose_portfolio(&input, &catalog()).is_err());
    }

    #[test]
    fn test_plan_rebalance() {
        let input = RebalanceInput {
            principal: dec!(1000),
            current: map(&[("A", dec!(0.7)), ("B", dec!(0.3))]),
            target: map(&[("A", dec!(0.4)), ("B", dec!(0.6))]),
        };
        let out = plan_rebalance(&input).unwrap();
        let res = &out.result;
        assert_eq!(res.deltas.len(), 2);
        assert_eq!(res.deltas[0].action, TradeAction::Sell);
        assert_eq!(res.deltas[0].amount, dec!(-300));
        assert_eq!(res.total_buys, dec!(300));
        assert_eq!(res.total_sells, dec!(300));
        assert_eq!(res.one_way_turnover, dec!(0.3));
        assert!(out.warnings.is_empty());
    }
}
