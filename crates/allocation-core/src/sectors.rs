//! Sector fan-out of a single allocation bucket.
//!
//! Takes the money assigned to one bucket (e.g. foreign stocks) and splits it
//! across a configured sector breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::distribution::DEFAULT_TOLERANCE;
use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

/// Weight of one sector inside the bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    #[serde(alias = "percentage")]
    pub fraction: Rate,
    #[serde(default)]
    pub description: String,
}

/// Sector name -> weight.
pub type SectorBreakdown = BTreeMap<String, SectorWeight>;

/// Sector configuration file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorConfig {
    pub sectors: SectorBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAllocation {
    pub amount: Money,
    pub fraction_of_bucket: Rate,
    pub fraction_of_total: Rate,
    pub description: String,
}

/// Split `principal * bucket_fraction` across the sector breakdown.
///
/// Sector fractions must sum to one within [`DEFAULT_TOLERANCE`].
pub fn allocate(
    principal: Money,
    bucket_fraction: Rate,
    breakdown: &SectorBreakdown,
) -> AllocationResult<BTreeMap<String, SectorAllocation>> {
    let total = breakdown
        .values()
        .fold(Decimal::ZERO, |total, sector| total.saturating_add(sector.fraction));
    if total.saturating_sub(Decimal::ONE).abs() > DEFAULT_TOLERANCE {
        return Err(AllocationError::InvalidSectorConfig {
            total,
            tolerance: DEFAULT_TOLERANCE,
        });
    }

    let bucket_total = bucket_amount(principal, bucket_fraction)?;
    breakdown
        .iter()
        .map(|(name, sector)| {
            let overflow = || AllocationError::overflow(format!("sectors.{name}"));
            Ok((
                name.clone(),
                SectorAllocation {
                    amount: bucket_total.checked_mul(sector.fraction).ok_or_else(overflow)?,
                    fraction_of_bucket: sector.fraction,
                    fraction_of_total: bucket_fraction.checked_mul(sector.fraction).ok_or_else(overflow)?,
                    description: sector.description.clone(),
                },
            ))
        })
        .collect()
}

fn bucket_amount(principal: Money, bucket_fraction: Rate) -> AllocationResult<Money> {
    principal
        .checked_mul(bucket_fraction)
        .ok_or_else(|| AllocationError::overflow("bucket_fraction"))
}

/// Input for a sector allocation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAllocationInput {
    /// Overall portfolio principal.
    pub principal: Money,
    /// Share of the principal assigned to the bucket (0-1).
    pub bucket_fraction: Rate,
    /// Bucket name for display (e.g. "Foreign Stocks").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub sectors: SectorBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRow {
    pub sector: String,
    #[serde(flatten)]
    pub allocation: SectorAllocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAllocationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub bucket_amount: Money,
    /// Largest sector first.
    pub sectors: Vec<SectorRow>,
}

/// Sector allocation report with bucket total and sorted rows.
pub fn allocate_sectors(
    input: &SectorAllocationInput,
) -> AllocationResult<ComputationOutput<SectorAllocationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.bucket_fraction < Decimal::ZERO || input.bucket_fraction > Decimal::ONE {
        warnings.push(format!(
            "Bucket fraction {} is outside 0-1; sector amounts scale accordingly",
            input.bucket_fraction
        ));
    }

    let mut sectors: Vec<SectorRow> = allocate(input.principal, input.bucket_fraction, &input.sectors)?
        .into_iter()
        .map(|(sector, allocation)| SectorRow { sector, allocation })
        .collect();
    sectors.sort_by(|a, b| {
        b.allocation
            .fraction_of_bucket
            .cmp(&a.allocation.fraction_of_bucket)
            .then_with(|| a.sector.cmp(&b.sector))
    });

    let output = SectorAllocationOutput {
        bucket: input.bucket.clone(),
        bucket_amount: bucket_amount(input.principal, input.bucket_fraction)?,
        sectors,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Sector fan-out: principal x bucket fraction x sector fraction",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "bucket_fraction": input.bucket_fraction.to_string(),
            "sectors": input.sectors.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
