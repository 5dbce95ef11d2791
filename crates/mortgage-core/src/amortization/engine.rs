//! Fixed-rate amortization engine.
//!
//! Derives the level monthly payment of a fully amortizing loan, the
//! lifetime totals, and the month-by-month split of each payment into
//! interest and principal. Every figure leaving the engine is rounded to
//! cents with banker's rounding.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: u32 = 12;
const CENTS_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How an interest-bearing loan reports its monthly payment.
///
/// `Legacy` reproduces the calculator this engine replaced: the annuity
/// payment is computed and then discarded, so every interest-bearing query
/// fails with [`MortgageError::NonNumericPayment`]. Zero-rate loans are
/// unaffected. `Corrected` returns the annuity figure.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnuityMode {
    #[default]
    Legacy,
    Corrected,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Validated loan parameters, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanTerms {
    principal: Money,
    monthly_rate: Rate,
    months: u32,
}

impl LoanTerms {
    /// Validate the raw inputs and derive the monthly rate and term.
    pub fn new(principal: Money, annual_rate_pct: Rate, years: u32) -> MortgageResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "principal".into(),
                reason: "Loan principal must be a positive number".into(),
            });
        }
        if annual_rate_pct < Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "annual_rate_pct".into(),
                reason: "Annual interest rate must not be negative".into(),
            });
        }
        if years == 0 {
            return Err(MortgageError::InvalidInput {
                field: "years".into(),
                reason: "Loan term must be a positive whole number of years".into(),
            });
        }
        let months = years
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or_else(|| MortgageError::InvalidInput {
                field: "years".into(),
                reason: format!("Loan term of {years} years exceeds the supported range"),
            })?;

        Ok(Self {
            principal,
            monthly_rate: annual_rate_pct / dec!(100) / Decimal::from(MONTHS_PER_YEAR),
            months,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    pub fn months(&self) -> u32 {
        self.months
    }
}

/// A single row of the payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment number (1-indexed)
    pub period: u32,
    /// Calendar due date, when the loan has a first payment date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Total paid this period
    pub payment: Money,
    /// Portion of the payment that reduces the balance
    pub principal: Money,
    /// Portion of the payment that covers interest
    pub interest: Money,
    /// Outstanding balance after the payment
    pub balance: Money,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Answers payment queries for one loan.
#[derive(Debug, Clone)]
pub struct AmortizationEngine {
    terms: LoanTerms,
    mode: AnnuityMode,
}

impl AmortizationEngine {
    /// Build an engine from principal, annual rate in percent, and term in
    /// years. Starts in [`AnnuityMode::Legacy`].
    pub fn new(principal: Money, annual_rate_pct: Rate, years: u32) -> MortgageResult<Self> {
        let terms = LoanTerms::new(principal, annual_rate_pct, years)?;
        debug!(
            principal = %terms.principal,
            monthly_rate = %terms.monthly_rate,
            months = terms.months,
            "amortization engine created"
        );
        Ok(Self {
            terms,
            mode: AnnuityMode::default(),
        })
    }

    /// Switch between legacy and corrected annuity reporting.
    pub fn with_mode(mut self, mode: AnnuityMode) -> Self {
        self.mode = mode;
        self
    }

    /// The validated terms this engine was built from.
    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// Payment mode in effect.
    pub fn mode(&self) -> AnnuityMode {
        self.mode
    }

    /// Level monthly payment, rounded to cents.
    pub fn monthly_payment(&self) -> MortgageResult<Money> {
        let LoanTerms {
            principal,
            monthly_rate,
            months,
        } = self.terms;

        if monthly_rate.is_zero() {
            return Ok((principal / Decimal::from(months)).round_dp(CENTS_DP));
        }

        let payment = annuity_payment(principal, monthly_rate, months)?;

        match self.mode {
            AnnuityMode::Corrected => Ok(payment.round_dp(CENTS_DP)),
            AnnuityMode::Legacy => {
                let discarded = payment.round_dp(CENTS_DP);
                warn!(%discarded, "legacy annuity mode discarded the computed payment");
                Err(MortgageError::NonNumericPayment { discarded })
            }
        }
    }

    /// Sum of all level payments, rounded to cents.
    pub fn total_payment(&self) -> MortgageResult<Money> {
        let monthly = self.monthly_payment()?;
        let total = checked(
            monthly.checked_mul(Decimal::from(self.terms.months)),
            "total payment",
        )?;
        Ok(total.round_dp(CENTS_DP))
    }

    /// Total paid in excess of the principal, rounded to cents.
    pub fn total_overpayment(&self) -> MortgageResult<Money> {
        let total = self.total_payment()?;
        let overpayment = checked(total.checked_sub(self.terms.principal), "total overpayment")?;
        Ok(overpayment.round_dp(CENTS_DP))
    }

    /// Month-by-month schedule.
    ///
    /// The last period pays off whatever balance remains, so its payment
    /// may differ from the level payment by a few cents.
    pub fn payment_schedule(&self) -> MortgageResult<Vec<PaymentRecord>> {
        let LoanTerms {
            principal: loan_amount,
            monthly_rate,
            months,
        } = self.terms;

        let level_payment = self.monthly_payment()?;
        let mut schedule = Vec::with_capacity(months as usize);
        let mut balance = loan_amount;

        for period in 1..=months {
            let interest = checked(balance.checked_mul(monthly_rate), "period interest")?;
            let mut payment = level_payment;
            let mut principal = checked(payment.checked_sub(interest), "period principal")?;

            if period == months {
                principal = balance;
                payment = checked(principal.checked_add(interest), "final payment")?;
                balance = Decimal::ZERO;
            } else {
                balance = checked(balance.checked_sub(principal), "running balance")?;
            }

            schedule.push(PaymentRecord {
                period,
                due_date: None,
                payment: payment.round_dp(CENTS_DP),
                principal: principal.round_dp(CENTS_DP),
                interest: interest.round_dp(CENTS_DP),
                balance: balance.max(Decimal::ZERO).round_dp(CENTS_DP),
            });
        }

        debug!(periods = schedule.len(), "payment schedule generated");
        Ok(schedule)
    }
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

/// Map a failed checked operation to [`MortgageError::Overflow`].
fn checked(value: Option<Decimal>, context: &str) -> MortgageResult<Decimal> {
    value.ok_or_else(|| MortgageError::Overflow {
        context: context.to_string(),
    })
}

/// P * r * (1+r)^n / ((1+r)^n - 1), unrounded. Requires r > 0.
fn annuity_payment(principal: Money, monthly_rate: Rate, months: u32) -> MortgageResult<Money> {
    let overflow = || MortgageError::Overflow {
        context: format!("annuity factor (1 + {monthly_rate})^{months}"),
    };

    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(months))
        .ok_or_else(overflow)?;
    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .ok_or_else(overflow)?;

    numerator
        .checked_div(growth - Decimal::ONE)
        .ok_or_else(overflow)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
