//! # Output Commands
//!
//! Fetching and releasing generated files. An output stays available
//! until it is released or replaced by the next result of the same tool.

use std::path::PathBuf;

use quicktools_render::data_url;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{OutputRegistry, RenderJobState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputIdArgs {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputData {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    pub path: Option<PathBuf>,
    pub data_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedOutput {
    pub released: String,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::not_found("Output", id))
}

/// Returns a live output's bytes as a data URL.
pub fn read_output(outputs: &OutputRegistry, args: OutputIdArgs) -> Result<OutputData, ApiError> {
    debug!(id = %args.id, "read_output command");

    let id = parse_id(&args.id)?;
    let output = outputs
        .get(id)
        .ok_or_else(|| ApiError::not_found("Output", &args.id))?;

    Ok(OutputData {
        id: id.to_string(),
        size: output.bytes.len(),
        data_url: data_url(output.mime_type, &output.bytes),
        file_name: output.file_name,
        mime_type: output.mime_type.to_string(),
        path: output.path,
    })
}

/// Releases an output before it would be replaced.
///
/// Files written to the output folder are kept; only the in-memory copy
/// goes away.
pub fn release_output(jobs: &[&RenderJobState], args: OutputIdArgs) -> Result<ReleasedOutput, ApiError> {
    debug!(id = %args.id, "release_output command");

    let id = parse_id(&args.id)?;
    let handle = jobs
        .iter()
        .find_map(|job| job.slot.take_if(id))
        .ok_or_else(|| ApiError::not_found("Output", &args.id))?;
    drop(handle);

    Ok(ReleasedOutput {
        released: id.to_string(),
    })
}
