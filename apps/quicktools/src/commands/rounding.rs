//! # Rounding Commands
//!
//! The rounding form submits the value as typed, so text is accepted and
//! parsed here; a non-numeric or non-finite value is a validation error.

use quicktools_core::rounding::{
    self, MethodComparison, PrecisionType, RoundingMethod, RoundingOutcome, RoundingRequest,
};
use quicktools_core::validation::{parse_finite, validate_finite};
use quicktools_core::RoundingRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::RoundingState;

/// A number as JSON number or as the text the user typed.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn parse(&self, field: &str) -> Result<f64, ApiError> {
        let value = match self {
            NumericInput::Number(n) => validate_finite(field, *n)?,
            NumericInput::Text(text) => parse_finite(field, text)?,
        };
        Ok(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundNumberArgs {
    pub value: NumericInput,
    pub method: RoundingMethod,
    pub precision_type: PrecisionType,
    pub precision: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRoundingArgs {
    pub value: NumericInput,
    pub precision_type: PrecisionType,
    pub precision: u32,
}

/// Rounding result with the percentage ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundNumberResponse {
    #[serde(flatten)]
    pub outcome: RoundingOutcome,
    /// `"N/A"` when the original value is zero.
    pub percentage_label: String,
    pub record_id: String,
}

/// Rounds one value and records it.
pub fn round_number(state: &RoundingState, args: RoundNumberArgs) -> Result<RoundNumberResponse, ApiError> {
    debug!(
        method = ?args.method,
        precision_type = ?args.precision_type,
        precision = args.precision,
        "round_number command"
    );

    let request = RoundingRequest {
        value: args.value.parse("value")?,
        method: args.method,
        precision_type: args.precision_type,
        precision: args.precision,
    };
    let outcome = rounding::round_number(request)?;

    let record = RoundingRecord::new(&request, &outcome);
    let record_id = record.id.clone();
    state.record(record);

    Ok(RoundNumberResponse {
        percentage_label: outcome.percentage_label(),
        outcome,
        record_id,
    })
}

/// The same value under all five methods.
pub fn compare_rounding(args: CompareRoundingArgs) -> Result<Vec<MethodComparison>, ApiError> {
    debug!(precision = args.precision, "compare_rounding command");
    let value = args.value.parse("value")?;
    Ok(rounding::compare_methods(value, args.precision_type, args.precision)?)
}

/// Recent roundings, newest first.
pub fn rounding_history(state: &RoundingState) -> Vec<RoundingRecord> {
    debug!("rounding_history command");
    state.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn args(value: serde_json::Value, method: &str, precision_type: &str, precision: u32) -> RoundNumberArgs {
        serde_json::from_value(json!({
            "value": value,
            "method": method,
            "precisionType": precision_type,
            "precision": precision,
        }))
        .unwrap()
    }

    #[test]
    fn test_round_text_input() {
        let state = RoundingState::new(10);
        let response = round_number(&state, args(json!("2.345"), "nearest", "decimal", 2)).unwrap();

        assert_eq!(response.outcome.formatted, "2.35");
        assert_eq!(rounding_history(&state)[0].id, response.record_id);
    }

    #[test]
    fn test_round_numeric_input_by_significant_figures() {
        let state = RoundingState::new(10);
        let response = round_number(&state, args(json!(123456), "down", "significant", 3)).unwrap();
        assert_eq!(response.outcome.rounded, 123000.0);
        assert_eq!(response.outcome.formatted, "123000");
    }

    #[test]
    fn test_zero_original_has_no_percentage() {
        let state = RoundingState::new(10);
        let response = round_number(&state, args(json!("0"), "up", "decimal", 2)).unwrap();
        assert_eq!(response.percentage_label, "N/A");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["percentage"], serde_json::Value::Null);
        assert_eq!(json["formatted"], "0.00");
    }

    #[test]
    fn test_non_numeric_input_is_rejected_and_not_recorded() {
        let state = RoundingState::new(10);
        for bad in ["abc", "", "NaN", "inf"] {
            let err = round_number(&state, args(json!(bad), "nearest", "decimal", 2)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "{bad:?}");
        }
        assert!(rounding_history(&state).is_empty());
    }

    #[test]
    fn test_compare_lists_every_method() {
        let rows = compare_rounding(
            serde_json::from_value(json!({
                "value": "2.5",
                "precisionType": "decimal",
                "precision": 0,
            }))
            .unwrap(),
        )
        .unwrap();

        let formatted: Vec<_> = rows.iter().map(|r| r.formatted.as_str()).collect();
        assert_eq!(formatted, vec!["3", "2", "3", "2", "2"]);
    }
}
