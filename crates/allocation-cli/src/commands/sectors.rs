use allocation_core::sectors::{self, SectorAllocationInput, SectorConfig};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

use super::envelope;
use crate::config::Settings;
use crate::input;
use crate::store;

/// Arguments for the sector fan-out of one allocation bucket
#[derive(Args)]
pub struct SectorsArgs {
    /// Path to JSON file with a SectorAllocationInput
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Sector breakdown file; defaults to the configured one
    #[arg(long)]
    pub sector_config: Option<PathBuf>,

    /// Person whose principal and target bucket fraction to use
    #[arg(long)]
    pub person: Option<String>,

    /// Bucket asset in the target portfolio
    #[arg(long, default_value = "Foreign Stocks")]
    pub bucket: String,

    /// Overall principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Share of the principal in the bucket (0 to 1)
    #[arg(long)]
    pub bucket_fraction: Option<Decimal>,
}

pub fn run_sectors(args: SectorsArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let allocation_input: SectorAllocationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        let config_path = args.sector_config.as_ref().unwrap_or(&settings.sector_config);
        let config: SectorConfig = input::file::read_json(config_path)?;

        let (mut principal, mut bucket_fraction) = (args.principal, args.bucket_fraction);
        if let Some(ref selector) = args.person {
            let person = store::load_person(&settings.people, selector)?;
            principal = principal.or_else(|| person.resolved_principal());
            bucket_fraction = bucket_fraction.or_else(|| {
                person
                    .target_portfolio
                    .as_ref()
                    .and_then(|t| t.get(&args.bucket).copied())
            });
        }

        SectorAllocationInput {
            principal: principal.ok_or("Provide --principal or a --person with a principal")?,
            bucket_fraction: bucket_fraction.ok_or_else(|| {
                format!(
                    "Provide --bucket-fraction or a --person whose target holds '{}'",
                    args.bucket
                )
            })?,
            bucket: Some(args.bucket.clone()),
            sectors: config.sectors,
        }
    };

    let result = sectors::allocate_sectors(&allocation_input)?;
    envelope(result, &[])
}
