pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage operations
pub type MortgageResult<T> = Result<T, MortgageError>;
