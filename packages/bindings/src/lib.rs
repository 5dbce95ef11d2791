use mortgage_core::amortization::{self, LoanInput};
use serde::Serialize;

#[derive(Serialize)]
struct MonthlyPaymentOutput {
    monthly_payment: rust_decimal::Decimal,
}

/// Full amortization report for a JSON `LoanInput`; errors carry their display text.
fn amortize_json(input_json: &str) -> Result<String, String> {
    let input: LoanInput = serde_json::from_str(input_json).map_err(|e| e.to_string())?;
    let output = amortization::amortize(&input).map_err(|e| e.to_string())?;
    serde_json::to_string(&output).map_err(|e| e.to_string())
}

/// Level monthly payment only, without building the schedule.
fn monthly_payment_json(input_json: &str) -> Result<String, String> {
    let input: LoanInput = serde_json::from_str(input_json).map_err(|e| e.to_string())?;
    let engine = input.to_engine().map_err(|e| e.to_string())?;
    let monthly_payment = engine.monthly_payment().map_err(|e| e.to_string())?;
    serde_json::to_string(&MonthlyPaymentOutput { monthly_payment }).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Node exports
// ---------------------------------------------------------------------------

// Test builds run without a Node host, so the napi glue is left out of them.
#[cfg(not(test))]
mod exports {
    use napi::Result as NapiResult;
    use napi_derive::napi;

    #[napi]
    pub fn amortize(input_json: String) -> NapiResult<String> {
        super::amortize_json(&input_json).map_err(napi::Error::from_reason)
    }

    #[napi]
    pub fn monthly_payment(input_json: String) -> NapiResult<String> {
        super::monthly_payment_json(&input_json).map_err(napi::Error::from_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTEREST_FREE: &str = r#"{"principal": "120000", "annual_rate_pct": "0", "years": 10}"#;
    const LEGACY_INTEREST: &str =
        r#"{"principal": "1000000", "annual_rate_pct": "7.5", "years": 10}"#;

    #[test]
    fn test_amortize_interest_free() {
        let json = amortize_json(INTEREST_FREE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["result"]["monthly_payment"].as_str().unwrap().starts_with("1000"));
        assert_eq!(value["result"]["number_of_payments"], 120);
        assert_eq!(value["result"]["schedule"].as_array().unwrap().len(), 120);
    }

    #[test]
    fn test_amortize_legacy_interest_error() {
        let reason = amortize_json(LEGACY_INTEREST).unwrap_err();
        assert!(reason.contains("not numeric in legacy annuity mode"), "{reason}");
        assert!(reason.contains("11870.18"), "{reason}");
    }

    #[test]
    fn test_monthly_payment_interest_free() {
        let json = monthly_payment_json(INTEREST_FREE).unwrap();
        assert!(json.starts_with(r#"{"monthly_payment":"1000"#), "{json}");
    }

    #[test]
    fn test_monthly_payment_legacy_interest_error() {
        let reason = monthly_payment_json(LEGACY_INTEREST).unwrap_err();
        assert!(reason.contains("not numeric in legacy annuity mode"), "{reason}");
    }

    #[test]
    fn test_malformed_request_error() {
        assert!(monthly_payment_json("{ not json").is_err());
        assert!(amortize_json(r#"{"principal": "-1", "annual_rate_pct": "5", "years": 10}"#)
            .unwrap_err()
            .contains("principal"));
    }
}
