//! Holdings ↔ fractional distributions.
//!
//! A distribution expresses each asset as a fraction of the portfolio
//! principal. Negative amounts (the active sub-portfolio) produce negative or
//! >1 fractions; those are kept as-is.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

/// Accepted rounding slack when checking that fractions sum to one.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.001);

/// Total monetary value of the holdings.
pub fn principal(holdings: &Holdings) -> AllocationResult<Money> {
    holdings.values().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(*amount)
            .ok_or_else(|| AllocationError::overflow("holdings"))
    })
}

/// Sum of all fractions in a distribution.
///
/// Saturates at the decimal range, so out-of-range input reads as far from one.
pub fn fraction_sum(distribution: &Distribution) -> Rate {
    distribution
        .values()
        .fold(Decimal::ZERO, |total, fraction| total.saturating_add(*fraction))
}

/// Convert monetary holdings into fractions of their principal.
pub fn normalize(holdings: &Holdings) -> AllocationResult<Distribution> {
    let total = principal(holdings)?;
    if total.is_zero() {
        return Err(AllocationError::ZeroPrincipal {
            context: "holdings normalization".into(),
        });
    }
    holdings
        .iter()
        .map(|(asset, amount)| {
            amount
                .checked_div(total)
                .map(|fraction| (asset.clone(), fraction))
                .ok_or_else(|| AllocationError::overflow(format!("holdings.{asset}")))
        })
        .collect()
}

/// Whether `|Σ fractions - 1| ≤ tolerance`. Advisory only.
pub fn validate_sums_to_one(distribution: &Distribution, tolerance: Decimal) -> bool {
    fraction_sum(distribution).saturating_sub(Decimal::ONE).abs() <= tolerance
}

/// Validate with [`DEFAULT_TOLERANCE`] and record a warning naming the actual
/// total when the check fails. Returns the check result.
pub fn check_sums_to_one(label: &str, distribution: &Distribution, warnings: &mut Vec<String>) -> bool {
    if validate_sums_to_one(distribution, DEFAULT_TOLERANCE) {
        return true;
    }
    warnings.push(format!(
        "{label} fractions sum to {}% rather than 100%",
        fraction_sum(distribution).saturating_mul(dec!(100)).round_dp(2)
    ));
    false
}

/// Expand fractions back into amounts of `principal`.
pub fn to_holdings(principal: Money, distribution: &Distribution) -> AllocationResult<Holdings> {
    distribution
        .iter()
        .map(|(asset, fraction)| {
            fraction
                .checked_mul(principal)
                .map(|amount| (asset.clone(), amount))
                .ok_or_else(|| AllocationError::overflow(format!("distribution.{asset}")))
        })
        .collect()
}
