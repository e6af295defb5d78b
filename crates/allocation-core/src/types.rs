use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and fractions expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Stable identifier of an asset in the catalog (e.g. "Gold").
pub type AssetKey = String;

/// Monetary amount held per asset. Amounts may be negative only for the
/// derived active portfolio.
pub type Holdings = BTreeMap<AssetKey, Money>;

/// Fraction of principal per asset.
pub type Distribution = BTreeMap<AssetKey, Rate>;

/// Macro scenario selecting which expected-return assumption applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Bad,
    Base,
    Good,
}

impl Scenario {
    /// Reporting order: bad, base, good.
    pub const ALL: [Scenario; 3] = [Scenario::Bad, Scenario::Base, Scenario::Good];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Bad => "bad",
            Scenario::Base => "base",
            Scenario::Good => "good",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bad" | "worst" => Ok(Scenario::Bad),
            "base" | "expected" => Ok(Scenario::Base),
            "good" | "best" => Ok(Scenario::Good),
            other => Err(format!("Unknown scenario '{other}'. Use: bad, base, good")),
        }
    }
}

/// Expected annual return of an asset under each scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReturns {
    pub bad: Rate,
    pub base: Rate,
    pub good: Rate,
}

impl ScenarioReturns {
    pub fn get(&self, scenario: Scenario) -> Rate {
        match scenario {
            Scenario::Bad => self.bad,
            Scenario::Base => self.base,
            Scenario::Good => self.good,
        }
    }
}

/// A value together with the advisory warnings raised while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessed<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Assessed<T> {
    pub fn new(value: T, warnings: Vec<String>) -> Self {
        Self { value, warnings }
    }

    /// Move the warnings into `sink` (skipping duplicates) and return the value.
    pub fn take(self, sink: &mut Vec<String>) -> T {
        merge_warnings(sink, self.warnings);
        self.value
    }
}

/// Append warnings to `sink`, keeping first-seen order and dropping repeats.
pub fn merge_warnings(sink: &mut Vec<String>, warnings: Vec<String>) {
    for w in warnings {
        if !sink.contains(&w) {
            sink.push(w);
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scenario_parse_and_display() {
        assert_eq!("Bad".parse::<Scenario>().unwrap(), Scenario::Bad);
        assert_eq!(" good ".parse::<Scenario>().unwrap(), Scenario::Good);
        assert!("awful".parse::<Scenario>().is_err());
        assert_eq!(Scenario::Base.to_string(), "base");
    }

    #[test]
    fn test_scenario_returns_lookup() {
        let r = ScenarioReturns {
            bad: dec!(-0.10),
            base: dec!(0.05),
            good: dec!(0.20),
        };
        assert_eq!(r.get(Scenario::Bad), dec!(-0.10));
        assert_eq!(r.get(Scenario::Good), dec!(0.20));
    }

    #[test]
    fn test_merge_warnings_dedupes() {
        let mut sink = vec!["a".to_string()];
        merge_warnings(&mut sink, vec!["b".into(), "a".into(), "b".into()]);
        assert_eq!(sink, vec!["a".to_string(), "b".to_string()]);
    }
}
