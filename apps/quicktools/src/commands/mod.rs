//! # Commands Module
//!
//! All commands exposed to the front end.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (Request enum, dispatch)
//! ├── base.rs        ◄─── convert_base, convert_common, base_history
//! ├── rounding.rs    ◄─── round_number, compare_rounding, rounding_history
//! ├── calculator.rs  ◄─── calculator, calculator_state
//! ├── qr.rs          ◄─── build_qr_payload, generate_qr
//! ├── watermark.rs   ◄─── watermark_pdf
//! ├── output.rs      ◄─── read_output, release_output
//! └── config.rs      ◄─── get_config
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end writes one line:                                             │
//! │  {"id": 3, "command": "convert_base",                                   │
//! │   "args": {"input": "ff", "fromBase": 16, "toBase": 2}}                 │
//! │         │                                                               │
//! │         │ (stdin)                                                       │
//! │         ▼                                                               │
//! │  Request::ConvertBase(ConvertBaseArgs { .. })                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  start() ──► base::convert_base(&state.base, args)                      │
//! │                 -> Result<ConversionRecord, ApiError>                   │
//! │         │                                                               │
//! │         │ (stdout)                                                      │
//! │         ▼                                                               │
//! │  {"id": 3, "ok": true, "data": {"result": "11111111", ...}}             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs its history
//! fn convert_base(state: &BaseState, args: ConvertBaseArgs)
//!
//! // Needs its job state, the output registry and config
//! async fn generate_qr(job: &RenderJobState, outputs: &OutputRegistry, config: &AppConfig, token, ..)
//! ```

pub mod base;
pub mod calculator;
pub mod config;
pub mod output;
pub mod qr;
pub mod rounding;
pub mod watermark;

use quicktools_core::calculator::CalculatorAction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, OutputRegistry, RenderJobState, RequestToken, StoredOutput};

/// Every command the front end can send, with its arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Request {
    ConvertBase(base::ConvertBaseArgs),
    ConvertCommon(base::ConvertCommonArgs),
    BaseHistory,
    RoundNumber(rounding::RoundNumberArgs),
    CompareRounding(rounding::CompareRoundingArgs),
    RoundingHistory,
    Calculator(CalculatorAction),
    CalculatorState,
    BuildQrPayload(qr::QrPayloadArgs),
    GenerateQr(qr::GenerateQrArgs),
    WatermarkPdf(watermark::WatermarkPdfArgs),
    ReadOutput(output::OutputIdArgs),
    ReleaseOutput(output::OutputIdArgs),
    GetConfig,
}

impl Request {
    /// Command name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::ConvertBase(_) => "convert_base",
            Request::ConvertCommon(_) => "convert_common",
            Request::BaseHistory => "base_history",
            Request::RoundNumber(_) => "round_number",
            Request::CompareRounding(_) => "compare_rounding",
            Request::RoundingHistory => "rounding_history",
            Request::Calculator(_) => "calculator",
            Request::CalculatorState => "calculator_state",
            Request::BuildQrPayload(_) => "build_qr_payload",
            Request::GenerateQr(_) => "generate_qr",
            Request::WatermarkPdf(_) => "watermark_pdf",
            Request::ReadOutput(_) => "read_output",
            Request::ReleaseOutput(_) => "release_output",
            Request::GetConfig => "get_config",
        }
    }
}

/// A request after its in-order part has run.
#[derive(Debug)]
pub enum Started {
    /// Finished without leaving the reader loop.
    Done(Result<Value, ApiError>),
    /// File or render work still to do, free to run alongside other requests.
    Pending(Pending),
}

/// The concurrent remainder of a request. Render jobs already hold the
/// token taken when the request arrived.
#[derive(Debug)]
pub enum Pending {
    BuildQrPayload(qr::QrPayloadArgs),
    GenerateQr(RequestToken, qr::GenerateQrArgs),
    WatermarkPdf(RequestToken, watermark::WatermarkPdfArgs),
}

impl Pending {
    pub async fn run(self, state: &AppState) -> Result<Value, ApiError> {
        match self {
            Pending::BuildQrPayload(args) => to_data(qr::build_qr_payload(args).await?),
            Pending::GenerateQr(token, args) => to_data(
                qr::generate_qr(&state.qr, &state.outputs, &state.config, token, args).await?,
            ),
            Pending::WatermarkPdf(token, args) => to_data(
                watermark::watermark_pdf(&state.watermark, &state.outputs, &state.config, token, args)
                    .await?,
            ),
        }
    }
}

/// Runs the part of `request` that must happen in arrival order.
///
/// ## Ordering
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  calculator, histories, conversions ──► run here, one after another     │
/// │  generate_qr, watermark_pdf ──────────► token taken here, render later  │
/// │  build_qr_payload ────────────────────► deferred (may read a file)      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn start(state: &AppState, request: Request) -> Started {
    let result = match request {
        Request::ConvertBase(args) => base::convert_base(&state.base, args).and_then(to_data),
        Request::ConvertCommon(args) => base::convert_common(args).and_then(to_data),
        Request::BaseHistory => to_data(base::base_history(&state.base)),
        Request::RoundNumber(args) => rounding::round_number(&state.rounding, args).and_then(to_data),
        Request::CompareRounding(args) => rounding::compare_rounding(args).and_then(to_data),
        Request::RoundingHistory => to_data(rounding::rounding_history(&state.rounding)),
        Request::Calculator(action) => to_data(calculator::calculator(&state.calculator, action)),
        Request::CalculatorState => to_data(calculator::calculator_state(&state.calculator)),
        Request::ReadOutput(args) => output::read_output(&state.outputs, args).and_then(to_data),
        Request::ReleaseOutput(args) => {
            output::release_output(&[&state.qr, &state.watermark], args).and_then(to_data)
        }
        Request::GetConfig => to_data(config::get_config(&state.config)),
        Request::BuildQrPayload(args) => return Started::Pending(Pending::BuildQrPayload(args)),
        Request::GenerateQr(args) => {
            return Started::Pending(Pending::GenerateQr(state.qr.tracker.begin(), args))
        }
        Request::WatermarkPdf(args) => {
            return Started::Pending(Pending::WatermarkPdf(state.watermark.tracker.begin(), args))
        }
    };
    Started::Done(result)
}

/// Runs one request to completion.
pub async fn dispatch(state: &AppState, request: Request) -> Result<Value, ApiError> {
    match start(state, request) {
        Started::Done(result) => result,
        Started::Pending(pending) => pending.run(state).await,
    }
}

fn to_data<T: Serialize>(data: T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Response serialization failed: {}", e);
        ApiError::internal("Response serialization failed")
    })
}

/// Makes `output` the job's current output, unless a newer request for
/// the same tool started while this one was running.
pub(crate) fn publish(
    job: &RenderJobState,
    outputs: &OutputRegistry,
    token: RequestToken,
    output: StoredOutput,
    tool: &str,
) -> Result<Uuid, ApiError> {
    let handle = outputs.insert(output);
    let id = handle.id();

    if job.slot.store_if(handle, || job.tracker.is_current(token)) {
        Ok(id)
    } else {
        warn!(tool, %id, "Discarding superseded result");
        Err(ApiError::superseded(tool))
    }
}
