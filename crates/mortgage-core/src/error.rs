use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// Legacy annuity mode: the payment was computed but not returned.
    #[error("Monthly payment is not numeric in legacy annuity mode (discarded figure: {discarded})")]
    NonNumericPayment { discarded: Decimal },

    #[error("Decimal overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}
