//! Asset reference data.
//!
//! The catalog maps each asset key to its risk score (0-10), expected return
//! under every scenario and whether its return is earned in a foreign currency
//! (currency-coupled). At most one asset is the currency reference: its
//! scenario return is the expected appreciation of that foreign currency.
//!
//! Raw catalog documents carry several generations of field names. They are
//! resolved here, once, into the canonical [`Asset`] shape so valuation code
//! never sees a legacy key.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

/// Upper bound of the risk score scale.
pub const MAX_RISK_SCORE: Decimal = dec!(10);

// ---------------------------------------------------------------------------
// Canonical types
// ---------------------------------------------------------------------------

/// Immutable reference data for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Risk score on a 0-10 scale.
    pub risk_score: Decimal,
    /// Expected annual return per scenario, in the asset's own currency.
    pub expected_return: ScenarioReturns,
    /// Whether the return must be grossed up by the reference currency's appreciation.
    pub is_currency_coupled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read-only lookup of assets by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    assets: BTreeMap<AssetKey, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_reference: Option<AssetKey>,
}

impl AssetCatalog {
    /// Build a catalog directly from canonical assets.
    ///
    /// A `currency_reference` that is not among `assets` is dropped.
    pub fn new(assets: BTreeMap<AssetKey, Asset>, currency_reference: Option<AssetKey>) -> Self {
        let currency_reference = currency_reference.filter(|k| assets.contains_key(k));
        Self {
            assets,
            currency_reference,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetKey, &Asset)> {
        self.assets.iter()
    }

    /// Key of the asset representing foreign-currency appreciation.
    pub fn currency_reference(&self) -> Option<&str> {
        self.currency_reference.as_deref()
    }

    pub fn is_currency_reference(&self, key: &str) -> bool {
        self.currency_reference.as_deref() == Some(key)
    }

    /// Expected currency appreciation under `scenario`; zero without a reference asset.
    pub fn reference_return(&self, scenario: Scenario) -> Rate {
        self.currency_reference
            .as_deref()
            .and_then(|k| self.assets.get(k))
            .map(|a| a.expected_return.get(scenario))
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Raw (file) schema
// ---------------------------------------------------------------------------

/// Nested scenario block; any scenario may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScenarioReturns {
    #[serde(default)]
    pub bad: Option<Decimal>,
    #[serde(default)]
    pub base: Option<Decimal>,
    #[serde(default)]
    pub good: Option<Decimal>,
}

/// One asset entry as stored in a catalog file, legacy names included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAssetRecord {
    #[serde(default, alias = "risk_puani")]
    pub risk_score: Option<Decimal>,
    #[serde(default)]
    pub expected_return: Option<RawScenarioReturns>,
    #[serde(default, alias = "kötü_senaryo_beklenen_getiri")]
    pub bad_scenario_return: Option<Decimal>,
    #[serde(default, alias = "beklenen_getiri_yuzde")]
    pub expected_percentage_return: Option<Decimal>,
    #[serde(default, alias = "iyi_senaryo_beklenen_getiri")]
    pub good_scenario_return: Option<Decimal>,
    #[serde(default, alias = "is_usd_based", alias = "dolar_bazli")]
    pub is_currency_coupled: Option<bool>,
    #[serde(default)]
    pub is_currency_reference: Option<bool>,
    #[serde(default, alias = "expected_return_description")]
    pub description: Option<String>,
}

impl RawAssetRecord {
    fn scenario_return(&self, scenario: Scenario) -> Option<Decimal> {
        let nested = self.expected_return.as_ref().and_then(|r| match scenario {
            Scenario::Bad => r.bad,
            Scenario::Base => r.base,
            Scenario::Good => r.good,
        });
        nested.or(match scenario {
            Scenario::Bad => self.bad_scenario_return,
            Scenario::Base => self.expected_percentage_return,
            Scenario::Good => self.good_scenario_return,
        })
    }
}

/// A catalog file: either a bare `key -> record` map, or a wrapper that
/// names the currency reference asset explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    Wrapped {
        #[serde(default)]
        currency_reference: Option<AssetKey>,
        assets: BTreeMap<AssetKey, RawAssetRecord>,
    },
    Flat(BTreeMap<AssetKey, RawAssetRecord>),
}

impl CatalogDocument {
    fn parts(&self) -> (Option<&AssetKey>, &BTreeMap<AssetKey, RawAssetRecord>) {
        match self {
            CatalogDocument::Wrapped {
                currency_reference,
                assets,
            } => (currency_reference.as_ref(), assets),
            CatalogDocument::Flat(assets) => (None, assets),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolve a raw catalog document into a canonical [`AssetCatalog`].
///
/// Missing risk scores and scenario returns default to zero with a warning.
/// Out-of-range risk scores and more than one flagged reference asset are
/// rejected.
pub fn load_catalog(
    document: &CatalogDocument,
) -> AllocationResult<ComputationOutput<AssetCatalog>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let (explicit_reference, raw_assets) = document.parts();

    let mut assets = BTreeMap::new();
    let mut flagged: Vec<&AssetKey> = Vec::new();

    for (key, raw) in raw_assets {
        let risk_score = match raw.risk_score {
            Some(score) => {
                if score < Decimal::ZERO || score > MAX_RISK_SCORE {
                    return Err(AllocationError::InvalidInput {
                        field: format!("{key}.risk_score"),
                        reason: format!("Risk score {score} outside 0-10 scale"),
                    });
                }
                score
            }
            None => {
                warnings.push(format!("Asset '{key}' has no risk score; assuming 0"));
                Decimal::ZERO
            }
        };

        let mut expected_return = ScenarioReturns::default();
        for scenario in Scenario::ALL {
            let value = raw.scenario_return(scenario).unwrap_or_else(|| {
                warnings.push(format!(
                    "Asset '{key}' has no {scenario}-scenario expected return; assuming 0"
                ));
                Decimal::ZERO
            });
            match scenario {
                Scenario::Bad => expected_return.bad = value,
                Scenario::Base => expected_return.base = value,
                Scenario::Good => expected_return.good = value,
            }
        }

        if raw.is_currency_reference.unwrap_or(false) {
            flagged.push(key);
        }

        assets.insert(
            key.clone(),
            Asset {
                risk_score,
                expected_return,
                is_currency_coupled: raw.is_currency_coupled.unwrap_or(false),
                description: raw.description.clone(),
            },
        );
    }

    let currency_reference = match explicit_reference {
        Some(key) if assets.contains_key(key) => Some(key.clone()),
        Some(key) => {
            warnings.push(format!(
                "Currency reference asset '{key}' is not in the catalog; currency returns treated as 0"
            ));
            None
        }
        None => match flagged.as_slice() {
            [] => None,
            [only] => Some((*only).clone()),
            many => {
                return Err(AllocationError::InvalidInput {
                    field: "is_currency_reference".into(),
                    reason: format!(
                        "Only one currency reference asset allowed, found {}: {}",
                        many.len(),
                        many.iter()
                            .map(|k| k.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
        },
    };

    if currency_reference.is_none() && assets.values().any(|a| a.is_currency_coupled) {
        warnings.push(
            "Currency-coupled assets present but no currency reference asset; \
             their returns are not grossed up"
                .into(),
        );
    }

    let catalog = AssetCatalog::new(assets, currency_reference);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Asset catalog resolution (legacy field aliases, scenario defaults)",
        &serde_json::json!({
            "assets": catalog.len(),
            "currency_reference": catalog.currency_reference(),
        }),
        warnings,
        elapsed,
        catalog,
    ))
}
