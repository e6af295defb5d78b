pub mod catalog;
pub mod distribution;
pub mod error;
pub mod person;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "decomposition")]
pub mod decomposition;

#[cfg(feature = "sectors")]
pub mod sectors;

#[cfg(feature = "risk_profile")]
pub mod risk_profile;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::AllocationError;
pub use types::*;

/// Standard result type for all allocation operations
pub type AllocationResult<T> = Result<T, AllocationError>;
