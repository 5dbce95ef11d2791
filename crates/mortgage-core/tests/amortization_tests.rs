use mortgage_core::amortization::{amortize, AmortizationEngine, AnnuityMode, LoanInput};
use mortgage_core::MortgageError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_loans() -> Vec<(Decimal, Decimal, u32)> {
    vec![
        (dec!(120000), dec!(0), 10),
        (dec!(100000), dec!(0), 7),
        (dec!(1000000), dec!(7.5), 10),
        (dec!(500000), dec!(15), 5),
        (dec!(250000), dec!(3.25), 30),
        (dec!(999.99), dec!(21.9), 1),
    ]
}

fn corrected(principal: Decimal, rate: Decimal, years: u32) -> AmortizationEngine {
    AmortizationEngine::new(principal, rate, years)
        .unwrap()
        .with_mode(AnnuityMode::Corrected)
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_schedule_length_matches_term() {
    for (p, r, y) in sample_loans() {
        let schedule = corrected(p, r, y).payment_schedule().unwrap();
        assert_eq!(schedule.len(), (y * 12) as usize, "loan {p} @ {r}% / {y}y");
        assert_eq!(schedule.first().unwrap().period, 1);
        assert_eq!(schedule.last().unwrap().period, y * 12);
    }
}

#[test]
fn test_balance_non_increasing_and_ends_at_zero() {
    for (p, r, y) in sample_loans() {
        let schedule = corrected(p, r, y).payment_schedule().unwrap();
        assert!(schedule[0].balance < p);
        for pair in schedule.windows(2) {
            assert!(
                pair[1].balance <= pair[0].balance,
                "balance rose at period {} for loan {p} @ {r}%",
                pair[1].period
            );
        }
        assert_eq!(schedule.last().unwrap().balance, Decimal::ZERO);
    }
}

#[test]
fn test_principal_components_sum_to_principal() {
    for (p, r, y) in sample_loans() {
        let schedule = corrected(p, r, y).payment_schedule().unwrap();
        let repaid: Decimal = schedule.iter().map(|row| row.principal).sum();
        // Each row rounds to the cent, so drift is bounded by half a cent per row.
        let tolerance = dec!(0.005) * Decimal::from(schedule.len() as u32);
        assert!(
            (repaid - p).abs() <= tolerance,
            "loan {p} @ {r}%: repaid {repaid}"
        );
    }
}

#[test]
fn test_components_add_up_to_payment() {
    for (p, r, y) in sample_loans() {
        for row in corrected(p, r, y).payment_schedule().unwrap() {
            let diff = (row.principal + row.interest - row.payment).abs();
            assert!(diff <= dec!(0.01), "period {} off by {diff}", row.period);
        }
    }
}

#[test]
fn test_total_payment_is_rounded_product() {
    for (p, r, y) in sample_loans() {
        let engine = corrected(p, r, y);
        let monthly = engine.monthly_payment().unwrap();
        let expected = (monthly * Decimal::from(y * 12)).round_dp(2);
        assert_eq!(engine.total_payment().unwrap(), expected);
        assert_eq!(engine.total_overpayment().unwrap(), (expected - p).round_dp(2));
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_interest_free_reference_scenario() {
    let engine = AmortizationEngine::new(dec!(120000), Decimal::ZERO, 10).unwrap();
    let schedule = engine.payment_schedule().unwrap();

    assert_eq!(engine.monthly_payment().unwrap(), dec!(1000.00));
    assert_eq!(schedule.len(), 120);
    assert_eq!(schedule.last().unwrap().balance, Decimal::ZERO);
}

#[test]
fn test_interest_bearing_reference_scenario_legacy() {
    let engine = AmortizationEngine::new(dec!(1000000), dec!(7.5), 10).unwrap();
    match engine.monthly_payment() {
        Err(MortgageError::NonNumericPayment { discarded }) => {
            assert_eq!(discarded, dec!(11870.18));
        }
        other => panic!("Expected NonNumericPayment, got {:?}", other),
    }
}

#[test]
fn test_interest_bearing_reference_scenario_corrected() {
    let engine = corrected(dec!(1000000), dec!(7.5), 10);
    assert_eq!(engine.monthly_payment().unwrap(), dec!(11870.18));
    assert_eq!(engine.total_payment().unwrap(), dec!(1424421.60));
    assert_eq!(engine.total_overpayment().unwrap(), dec!(424421.60));
}

// ===========================================================================
// Full report
// ===========================================================================

#[test]
fn test_amortize_report_corrected() {
    let input = LoanInput {
        principal: dec!(1000000),
        annual_rate_pct: dec!(7.5),
        years: dec!(10),
        first_payment_date: None,
        mode: AnnuityMode::Corrected,
    };
    let out = amortize(&input).unwrap();
    let report = &out.result;

    assert_eq!(report.number_of_payments, 120);
    assert_eq!(report.schedule.len(), 120);
    assert_eq!(report.monthly_payment, dec!(11870.18));

    let interest: Decimal = report.schedule.iter().map(|r| r.interest).sum();
    assert_eq!(report.total_interest, interest);
    assert_eq!(report.final_payment, report.schedule.last().unwrap().payment);
    assert_eq!(out.methodology, "Level annuity amortization");
    assert!(out.assumptions.get("principal").is_some());
}

#[test]
fn test_amortize_legacy_fails_before_any_output() {
    let input = LoanInput {
        principal: dec!(1000000),
        annual_rate_pct: dec!(7.5),
        years: dec!(10),
        first_payment_date: None,
        mode: AnnuityMode::Legacy,
    };
    assert!(matches!(
        amortize(&input),
        Err(MortgageError::NonNumericPayment { .. })
    ));
}

#[test]
fn test_amortize_validation_precedes_computation() {
    let input = LoanInput {
        principal: dec!(-1),
        annual_rate_pct: dec!(7.5),
        years: dec!(10),
        first_payment_date: None,
        mode: AnnuityMode::Legacy,
    };
    match amortize(&input) {
        Err(MortgageError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}
