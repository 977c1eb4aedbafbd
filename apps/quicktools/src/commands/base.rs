//! # Base Converter Commands
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input "ff", from base 16, to base 2                                    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  convert_base { input: "ff", fromBase: 16, toBase: 2 }                  │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  1. Validate digits against base 16 (case-insensitive)         │    │
//! │  │  2. Convert through the integer value                          │    │
//! │  │  3. Record { input, fromBase, toBase, result } in history      │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  Result "11111111", history panel updates                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quicktools_core::base::{self, CommonBases};
use quicktools_core::ConversionRecord;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::BaseState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertBaseArgs {
    pub input: String,
    pub from_base: u32,
    pub to_base: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertCommonArgs {
    pub input: String,
    pub from_base: u32,
}

/// Converts between two bases and records the conversion.
///
/// Surrounding whitespace in the input is ignored.
pub fn convert_base(state: &BaseState, args: ConvertBaseArgs) -> Result<ConversionRecord, ApiError> {
    debug!(from = args.from_base, to = args.to_base, "convert_base command");

    let input = args.input.trim();
    let result = base::convert(input, args.from_base, args.to_base)?;

    let record = ConversionRecord::new(input, args.from_base, args.to_base, result);
    state.record(record.clone());
    Ok(record)
}

/// Shows the input in binary, octal, decimal and hex. Not recorded.
pub fn convert_common(args: ConvertCommonArgs) -> Result<CommonBases, ApiError> {
    debug!(from = args.from_base, "convert_common command");
    Ok(base::convert_common(args.input.trim(), args.from_base)?)
}

/// Recent conversions, newest first.
pub fn base_history(state: &BaseState) -> Vec<ConversionRecord> {
    debug!("base_history command");
    state.snapshot()
}
