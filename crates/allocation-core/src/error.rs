use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Zero principal in {context}: fractions are undefined")]
    ZeroPrincipal { context: String },

    #[error("Invalid sector configuration: fractions sum to {total}, expected 1 (±{tolerance})")]
    InvalidSectorConfig { total: Decimal, tolerance: Decimal },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AllocationError {
    /// An amount in `field` left the representable decimal range.
    pub fn overflow(field: impl Into<String>) -> Self {
        AllocationError::InvalidInput {
            field: field.into(),
            reason: "amount overflows the decimal range".into(),
        }
    }
}

impl From<serde_json::Error> for AllocationError {
    fn from(e: serde_json::Error) -> Self {
        AllocationError::SerializationError(e.to_string())
    }
}
