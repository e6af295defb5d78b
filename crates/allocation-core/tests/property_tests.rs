use std::collections::BTreeMap;

use allocation_core::catalog::{Asset, AssetCatalog};
use allocation_core::decomposition;
use allocation_core::distribution::{self, fraction_sum};
use allocation_core::valuation;
use allocation_core::{AllocationError, Distribution, Holdings, ScenarioReturns};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ASSETS: [&str; 6] = ["Cash", "Gold", "Silver", "Stocks", "Bonds", "Crypto"];

/// Holdings with 1..=6 assets and amounts in whole cents.
fn holdings_strategy(min_cents: i64, max_cents: i64) -> impl Strategy<Value = Holdings> {
    prop::collection::btree_map(
        prop::sample::select(ASSETS.to_vec()),
        min_cents..max_cents,
        1..=ASSETS.len(),
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(k, cents)| (k.to_string(), Decimal::new(cents, 2)))
            .collect()
    })
}

/// Base percentages in whole basis points, each 0-60%.
fn base_strategy() -> impl Strategy<Value = Distribution> {
    prop::collection::btree_map(prop::sample::select(ASSETS.to_vec()), 0i64..6000, 0..=ASSETS.len())
        .prop_map(|m| {
            m.into_iter()
                .map(|(k, bps)| (k.to_string(), Decimal::new(bps, 4)))
                .collect()
        })
}

/// Holdings with mixed magnitudes: up to 15 significant digits at 0-22 decimal places.
fn wide_holdings_strategy() -> impl Strategy<Value = Holdings> {
    prop::collection::btree_map(
        prop::sample::select(ASSETS.to_vec()),
        (0i64..1_000_000_000_000_000, 0u32..=22),
        1..=ASSETS.len(),
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(k, (mantissa, scale))| (k.to_string(), Decimal::new(mantissa, scale)))
            .collect()
    })
}

/// Base fractions in 0-1 carrying anywhere from 0 to 28 decimal places.
fn wide_base_strategy() -> impl Strategy<Value = Distribution> {
    prop::collection::btree_map(
        prop::sample::select(ASSETS.to_vec()),
        (0i128..10_i128.pow(28), 0u32..=28),
        0..=ASSETS.len(),
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(k, (mantissa, dp))| (k.to_string(), Decimal::from_i128_with_scale(mantissa, 28).round_dp(dp)))
            .collect()
    })
}

fn assert_split_is_exact(h: &Holdings, base: &Distribution) -> Result<(), TestCaseError> {
    let d = match decomposition::decompose(h, base) {
        Ok(d) => d,
        Err(AllocationError::InvalidInput { field, .. }) => {
            prop_assert!(field.starts_with("base_percentages."), "unexpected field {}", field);
            return Ok(());
        }
        Err(other) => return Err(TestCaseError::fail(format!("unexpected error {other:?}"))),
    };
    for asset in ASSETS {
        let overall = h.get(asset).copied().unwrap_or(Decimal::ZERO);
        let b = d.base_holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
        let a = d.active_holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
        prop_assert_eq!(b + a, overall);
    }
    let rebuilt = decomposition::recombine(&d.base_holdings, &d.active_holdings);
    for (asset, amount) in h {
        prop_assert_eq!(rebuilt[asset], *amount);
    }
    Ok(())
}

fn risk_catalog(scores: &[i64]) -> AssetCatalog {
    let assets: BTreeMap<String, Asset> = ASSETS
        .iter()
        .zip(scores)
        .map(|(k, s)| {
            (
                k.to_string(),
                Asset {
                    risk_score: Decimal::from(*s),
                    expected_return: ScenarioReturns::default(),
                    is_currency_coupled: false,
                    description: None,
                },
            )
        })
        .collect();
    AssetCatalog::new(assets, None)
}

proptest! {
    #[test]
    fn normalize_sums_to_one_and_is_proportional(h in holdings_strategy(1, 100_000_000)) {
        let d = distribution::normalize(&h).unwrap();
        let principal = distribution::principal(&h).unwrap();
        prop_assert!((fraction_sum(&d) - Decimal::ONE).abs() <= dec!(0.000001));
        for (asset, amount) in &h {
            prop_assert_eq!(d[asset], amount / principal);
        }
    }

    #[test]
    fn normalize_round_trips_amounts(h in holdings_strategy(1, 100_000_000)) {
        let d = distribution::normalize(&h).unwrap();
        let back = distribution::to_holdings(distribution::principal(&h).unwrap(), &d).unwrap();
        for (asset, amount) in &h {
            prop_assert!((back[asset] - amount).abs() <= dec!(0.000001));
        }
    }

    #[test]
    fn weighted_risk_is_convex(
        h in holdings_strategy(1, 10_000_000),
        scores in prop::collection::vec(0i64..=10, ASSETS.len()),
    ) {
        let catalog = risk_catalog(&scores);
        let d = distribution::normalize(&h).unwrap();
        let present: Vec<Decimal> = h
            .keys()
            .map(|k| catalog.lookup(k).unwrap().risk_score)
            .collect();
        let lo = present.iter().copied().min().unwrap();
        let hi = present.iter().copied().max().unwrap();
        let risk = valuation::weighted_risk(&d, &catalog).value;
        // fractions carry 28 significant digits; allow for the last one
        let eps = dec!(0.0000000001);
        prop_assert!(risk >= lo - eps && risk <= hi + eps, "{} not in [{}, {}]", risk, lo, hi);
    }

    #[test]
    fn base_plus_active_is_overall_exactly(
        h in holdings_strategy(0, 100_000_000),
        base in base_strategy(),
    ) {
        // Whole cents and basis points always split without coarsening.
        let d = decomposition::decompose(&h, &base).unwrap();
        for asset in ASSETS {
            let overall = h.get(asset).copied().unwrap_or(Decimal::ZERO);
            let b = d.base_holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
            prop_assert_eq!(b, d.overall_principal * base.get(asset).copied().unwrap_or(Decimal::ZERO));
            let a = d.active_holdings.get(asset).copied().unwrap_or(Decimal::ZERO);
            prop_assert_eq!(b + a, overall);
        }
        assert_split_is_exact(&h, &base)?;
    }

    #[test]
    fn base_plus_active_is_exact_across_scales(
        h in wide_holdings_strategy(),
        base in wide_base_strategy(),
    ) {
        assert_split_is_exact(&h, &base)?;
    }
}
