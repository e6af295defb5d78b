pub mod catalog;
pub mod compare;
pub mod decompose;
pub mod people;
pub mod record;
pub mod risk_profile;
pub mod sectors;
pub mod valuation;

use allocation_core::{merge_warnings, ComputationOutput, Holdings};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Serialize an engine result, putting catalog resolution warnings first.
pub fn envelope<T: Serialize>(
    mut output: ComputationOutput<T>,
    catalog_warnings: &[String],
) -> Result<Value, Box<dyn std::error::Error>> {
    if !catalog_warnings.is_empty() {
        let mut warnings = catalog_warnings.to_vec();
        merge_warnings(&mut warnings, std::mem::take(&mut output.warnings));
        output.warnings = warnings;
    }
    Ok(serde_json::to_value(output)?)
}

/// Parse `ASSET=VALUE`. The asset name may contain spaces and `=`; the value
/// is taken after the last `=`.
pub fn parse_asset_value(s: &str) -> Result<(String, Decimal), String> {
    let (asset, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ASSET=VALUE, got '{}'", s))?;
    let asset = asset.trim();
    if asset.is_empty() {
        return Err(format!("missing asset name in '{}'", s));
    }
    let value: Decimal = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in '{}': {}", s, e))?;
    Ok((asset.to_string(), value))
}

/// Collect repeated `--holding` style pairs; later entries for the same asset win.
pub fn collect_pairs(pairs: &[(String, Decimal)]) -> Holdings {
    pairs.iter().cloned().collect()
}
