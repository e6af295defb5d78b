//! Canonical person record.
//!
//! Older people files use different field names for the same data; the
//! aliases below are the only place those names are recognised. Unknown
//! fields survive a load/save round trip through `extra`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::distribution;
use crate::error::AllocationError;
use crate::types::*;
use crate::AllocationResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(alias = "isim")]
    pub name: String,
    #[serde(default, alias = "ana_para", skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    #[serde(
        default,
        alias = "amount_distribution",
        alias = "current_values",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_portfolio_amount: Option<Holdings>,
    #[serde(
        default,
        alias = "guncel_portfoy_dagilimi",
        alias = "current_portfolio",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_portfolio_distribution: Option<Distribution>,
    #[serde(default, alias = "sabit_portfoy_dagilimi", skip_serializing_if = "Option::is_none")]
    pub base_portfolio_distribution: Option<Distribution>,
    #[serde(default, alias = "hedef_portfoy", skip_serializing_if = "Option::is_none")]
    pub target_portfolio: Option<Distribution>,
    /// Result of the risk profile survey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PersonRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Current amounts: recorded amounts if present, otherwise the current
    /// distribution scaled by the principal.
    pub fn current_holdings(&self) -> AllocationResult<Holdings> {
        if let Some(amounts) = &self.current_portfolio_amount {
            return Ok(amounts.clone());
        }
        match (&self.current_portfolio_distribution, self.principal) {
            (Some(dist), Some(principal)) => distribution::to_holdings(principal, dist),
            _ => Err(AllocationError::InsufficientData(format!(
                "{} has no current portfolio recorded",
                self.name
            ))),
        }
    }

    /// Current fractions, derived from amounts when those are recorded.
    pub fn current_distribution(&self) -> AllocationResult<Distribution> {
        if let Some(amounts) = &self.current_portfolio_amount {
            return distribution::normalize(amounts);
        }
        self.current_portfolio_distribution.clone().ok_or_else(|| {
            AllocationError::InsufficientData(format!(
                "{} has no current portfolio recorded",
                self.name
            ))
        })
    }

    /// Principal: recorded value, else the sum of recorded amounts.
    pub fn resolved_principal(&self) -> Option<Money> {
        self.principal.or_else(|| {
            self.current_portfolio_amount
                .as_ref()
                .and_then(|amounts| distribution::principal(amounts).ok())
        })
    }

    /// Replace the current portfolio with fresh holdings.
    ///
    /// Sets amounts, principal and the derived distribution in one step so
    /// the three never disagree.
    pub fn record_current_holdings(&mut self, holdings: Holdings, at: DateTime<Utc>) -> AllocationResult<()> {
        let dist = distribution::normalize(&holdings)?;
        self.principal = Some(distribution::principal(&holdings)?);
        self.current_portfolio_amount = Some(holdings);
        self.current_portfolio_distribution = Some(dist);
        self.updated_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_legacy_turkish_record() {
        let p: PersonRecord = serde_json::from_str(
            r#"{
                "isim": "Ayşe",
                "ana_para": 1000,
                "guncel_portfoy_dagilimi": {"Gold": "0.25", "Cash": "0.75"},
                "hedef_portfoy": {"Gold": "0.5", "Cash": "0.5"}
            }"#,
        )
        .unwrap();
        assert_eq!(p.name, "Ayşe");
        let h = p.current_holdings().unwrap();
        assert_eq!(h["Gold"], dec!(250));
        assert_eq!(p.target_portfolio.unwrap()["Cash"], dec!(0.5));
    }

    #[test]
    fn test_amounts_take_precedence() {
        let p: PersonRecord = serde_json::from_str(
            r#"{
                "name": "Sam",
                "principal": 999,
                "current_portfolio_amount": {"Gold": 300, "Cash": 100},
                "current_portfolio_distribution": {"Gold": "0.1", "Cash": "0.9"}
            }"#,
        )
        .unwrap();
        assert_eq!(p.current_holdings().unwrap()["Gold"], dec!(300));
        assert_eq!(p.current_distribution().unwrap()["Gold"], dec!(0.75));
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let p: PersonRecord =
            serde_json::from_str(r#"{"name": "Lee", "notes": "rebalance in May"}"#).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["notes"], "rebalance in May");
        assert!(p.current_holdings().is_err());
    }

    #[test]
    fn test_record_current_holdings() {
        let mut p = PersonRecord::new("Kim");
        let mut h = Holdings::new();
        h.insert("Gold".into(), dec!(600));
        h.insert("Cash".into(), dec!(400));
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        p.record_current_holdings(h, at).unwrap();
        assert_eq!(p.principal, Some(dec!(1000)));
        assert_eq!(p.current_portfolio_distribution.as_ref().unwrap()["Gold"], dec!(0.6));
        assert_eq!(p.updated_at, Some(at));
    }

    #[test]
    fn test_record_zero_holdings_rejected() {
        let mut p = PersonRecord::new("Kim");
        let mut h = Holdings::new();
        h.insert("Gold".into(), Decimal::ZERO);
        assert!(p.record_current_holdings(h, Utc::now()).is_err());
        assert!(p.principal.is_none());
    }
}
