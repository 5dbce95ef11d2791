//! Loan requests and the full amortization report.
//!
//! [`amortize`] is the single entry point used by the CLI and the bindings:
//! it validates a [`LoanInput`], runs every engine query, and wraps the
//! results in the standard output envelope.

use std::time::Instant;

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::{AmortizationEngine, AnnuityMode, PaymentRecord};
use crate::error::MortgageError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A loan as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount borrowed
    pub principal: Money,
    /// Annual interest rate in percent (7.5 = 7.5%)
    pub annual_rate_pct: Rate,
    /// Term in years; must be a whole number
    pub years: Decimal,
    /// Due date of the first payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    /// Payment mode for interest-bearing loans
    #[serde(default)]
    pub mode: AnnuityMode,
}

impl LoanInput {
    /// Validate the term and build an engine in the requested mode.
    pub fn to_engine(&self) -> MortgageResult<AmortizationEngine> {
        let years = whole_years(self.years)?;
        let engine = AmortizationEngine::new(self.principal, self.annual_rate_pct, years)?;
        Ok(engine.with_mode(self.mode))
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Lifetime figures plus the full schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Level monthly payment
    pub monthly_payment: Money,
    /// Level payment times the number of payments
    pub total_payment: Money,
    /// Total payment less principal
    pub total_overpayment: Money,
    /// Sum of the interest column of the schedule
    pub total_interest: Money,
    /// Payment due in the last period, after residual correction
    pub final_payment: Money,
    /// Number of monthly payments
    pub number_of_payments: u32,
    /// Month-by-month schedule
    pub schedule: Vec<PaymentRecord>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize a loan and report the payment, totals, and schedule.
pub fn amortize(input: &LoanInput) -> MortgageResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let engine = input.to_engine()?;
    let terms = engine.terms();

    let monthly_payment = engine.monthly_payment()?;
    let total_payment = engine.total_payment()?;
    let total_overpayment = engine.total_overpayment()?;
    let mut schedule = engine.payment_schedule()?;

    if let Some(first) = input.first_payment_date {
        assign_due_dates(&mut schedule, first)?;
    }

    if terms.monthly_rate().is_zero() {
        warnings.push("Interest rate is zero; principal is repaid in equal instalments.".into());
    }

    let final_payment = schedule
        .last()
        .map(|r| r.payment)
        .unwrap_or(monthly_payment);
    if final_payment != monthly_payment {
        warnings.push(format!(
            "Final payment adjusted by {} to clear the residual balance.",
            final_payment - monthly_payment
        ));
    }

    let total_interest = schedule
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.interest))
        .ok_or_else(|| MortgageError::Overflow {
            context: "total interest".into(),
        })?;

    let output = AmortizationOutput {
        monthly_payment,
        total_payment,
        total_overpayment,
        total_interest,
        final_payment,
        number_of_payments: terms.months(),
        schedule,
    };

    let methodology = match engine.mode() {
        AnnuityMode::Legacy => "Level annuity amortization (legacy mode)",
        AnnuityMode::Corrected => "Level annuity amortization",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn whole_years(years: Decimal) -> MortgageResult<u32> {
    let invalid = || MortgageError::InvalidInput {
        field: "years".into(),
        reason: format!("Loan term must be a positive whole number of years, got {years}"),
    };

    if years <= Decimal::ZERO || !years.fract().is_zero() {
        return Err(invalid());
    }
    years.to_u32().ok_or_else(invalid)
}

fn assign_due_dates(schedule: &mut [PaymentRecord], first: NaiveDate) -> MortgageResult<()> {
    for record in schedule.iter_mut() {
        let date = first
            .checked_add_months(Months::new(record.period - 1))
            .ok_or_else(|| MortgageError::InvalidInput {
                field: "first_payment_date".into(),
                reason: format!("Due date of payment {} is out of range", record.period),
            })?;
        record.due_date = Some(date);
    }
    Ok(())
}
