use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::amortization::{self, AnnuityMode, LoanInput};

use crate::input;
use crate::OutputFormat;

/// Arguments for loan amortization
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AmortizeArgs {
    /// Amount borrowed (e.g. 1000000)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 7.5 for 7.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in whole years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Due date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,

    /// Report the computed annuity payment for interest-bearing loans
    /// instead of the legacy non-numeric result
    #[arg(long)]
    pub corrected_annuity: bool,

    /// Number of schedule rows shown in table output (0 shows the full
    /// schedule); json, csv, and minimal output always carry every row
    #[arg(long, default_value = "12")]
    pub preview_months: usize,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl AmortizeArgs {
    fn has_loan_flags(&self) -> bool {
        self.principal.is_some() || self.rate.is_some() || self.years.is_some()
    }
}

pub fn run_amortize(
    args: AmortizeArgs,
    format: &OutputFormat,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if args.has_loan_flags() {
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            first_payment_date: None,
            mode: AnnuityMode::Legacy,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--principal, --rate and --years (or --input <file.json>, or stdin) required".into());
    };

    if args.corrected_annuity {
        loan.mode = AnnuityMode::Corrected;
    }
    if args.first_payment_date.is_some() {
        loan.first_payment_date = args.first_payment_date;
    }

    let mut result = amortization::amortize(&loan)?;
    if matches!(format, OutputFormat::Table) && args.preview_months > 0 {
        result.result.schedule.truncate(args.preview_months);
    }
    Ok(serde_json::to_value(result)?)
}
