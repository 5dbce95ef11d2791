pub mod engine;
pub mod loan;

pub use engine::{AmortizationEngine, AnnuityMode, LoanTerms, PaymentRecord};
pub use loan::{amortize, AmortizationOutput, LoanInput};
