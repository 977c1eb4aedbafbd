//! # QR Code Commands
//!
//! ## Generate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate_qr { kind, fields, style?, logoPath?, imagePath? }            │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  1. Request token taken on arrival (newer ones invalidate it)  │    │
//! │  │  2. Build the payload string (image: shrink to a data URL)     │    │
//! │  │  3. Render on a blocking thread (qrcode + image)               │    │
//! │  │  4. Still current? publish to the QR slot : SUPERSEDED         │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  { outputId, dataUrl, fileName, payload, modules }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use quicktools_core::qr::{build_payload, qr_download_filename, QrContentType, QrFields, QrStyle};
use quicktools_render::{prepare_image_payload, render_qr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::publish;
use crate::error::ApiError;
use crate::state::{AppConfig, OutputRegistry, RenderJobState, RequestToken, StoredOutput};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayloadArgs {
    pub kind: QrContentType,
    #[serde(default)]
    pub fields: QrFields,
    /// Image file for `kind: "image"`, used when no data URL is given.
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrArgs {
    pub kind: QrContentType,
    #[serde(default)]
    pub fields: QrFields,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    /// Defaults to the configured size with default colors.
    #[serde(default)]
    pub style: Option<QrStyle>,
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayloadResponse {
    pub payload: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQr {
    pub output_id: String,
    pub data_url: String,
    pub file_name: String,
    pub payload: String,
    pub modules: u32,
}

/// Builds the string a QR code of `kind` would carry.
pub async fn build_qr_payload(args: QrPayloadArgs) -> Result<QrPayloadResponse, ApiError> {
    debug!(kind = ?args.kind, "build_qr_payload command");
    let payload = resolve_payload(args.kind, args.fields, args.image_path.as_deref()).await?;
    Ok(QrPayloadResponse { payload })
}

/// Renders a QR code and makes it the QR tool's current output.
///
/// `token` comes from `job.tracker` when the request arrived.
pub async fn generate_qr(
    job: &RenderJobState,
    outputs: &OutputRegistry,
    config: &AppConfig,
    token: RequestToken,
    args: GenerateQrArgs,
) -> Result<GeneratedQr, ApiError> {
    debug!(kind = ?args.kind, with_logo = args.logo_path.is_some(), "generate_qr command");

    let payload = resolve_payload(args.kind, args.fields, args.image_path.as_deref()).await?;
    let style = args
        .style
        .unwrap_or_else(|| QrStyle::with_size(config.default_qr_size));
    let logo = match &args.logo_path {
        Some(path) => Some(tokio::fs::read(path).await?),
        None => None,
    };

    let text = payload.clone();
    let rendered = tokio::task::spawn_blocking(move || render_qr(&text, &style, logo.as_deref())).await??;

    let file_name = qr_download_filename(Utc::now());
    let output = StoredOutput::new(rendered.png, "image/png", file_name.clone());
    let output_id = publish(job, outputs, token, output, "QR")?;

    info!(%output_id, modules = rendered.modules, "QR code generated");

    Ok(GeneratedQr {
        output_id: output_id.to_string(),
        data_url: rendered.data_url,
        file_name,
        payload,
        modules: rendered.modules,
    })
}

async fn resolve_payload(
    kind: QrContentType,
    mut fields: QrFields,
    image_path: Option<&Path>,
) -> Result<String, ApiError> {
    let needs_image = kind == QrContentType::Image && fields.image_data_url.is_none();
    if let Some(path) = image_path.filter(|_| needs_image) {
        let bytes = tokio::fs::read(path).await?;
        let data_url = tokio::task::spawn_blocking(move || prepare_image_payload(&bytes)).await??;
        fields.image_data_url = Some(data_url);
    }
    Ok(build_payload(kind, &fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn config() -> AppConfig {
        AppConfig {
            output_dir: std::env::temp_dir(),
            history_limit: 10,
            default_qr_size: 200,
            log_filter: None,
        }
    }

    fn generate_args(value: serde_json::Value) -> GenerateQrArgs {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_build_payload_for_wifi() {
        let args = serde_json::from_value(json!({
            "kind": "wifi",
            "fields": { "ssid": "Cafe", "password": "latte" }
        }))
        .unwrap();
        let response = build_qr_payload(args).await.unwrap();
        assert_eq!(response.payload, "WIFI:S:Cafe;T:WPA;P:latte;;");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let args = serde_json::from_value(json!({ "kind": "phone" })).unwrap();
        let err = build_qr_payload(args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_image_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        image::RgbImage::from_pixel(800, 400, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let args = QrPayloadArgs {
            kind: QrContentType::Image,
            fields: QrFields::default(),
            image_path: Some(path),
        };
        let response = build_qr_payload(args).await.unwrap();
        assert!(response.payload.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_generate_uses_configured_size_and_registers_output() {
        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let args = generate_args(json!({ "kind": "url", "fields": { "url": "example.com" } }));

        let generated = generate_qr(&job, &outputs, &config(), job.tracker.begin(), args)
            .await
            .unwrap();

        assert_eq!(generated.payload, "https://example.com");
        assert!(generated.file_name.starts_with("qrcode-"));
        assert_eq!(job.slot.current_id().map(|id| id.to_string()), Some(generated.output_id.clone()));

        let id = job.slot.current_id().unwrap();
        let png = outputs.get(id).unwrap().bytes;
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (200, 200));
    }

    #[tokio::test]
    async fn test_new_output_replaces_previous() {
        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();

        let first_args = generate_args(json!({ "kind": "text", "fields": { "text": "one" } }));
        let first = generate_qr(&job, &outputs, &config(), job.tracker.begin(), first_args)
            .await
            .unwrap();
        let second_args = generate_args(json!({ "kind": "text", "fields": { "text": "two" } }));
        let second = generate_qr(&job, &outputs, &config(), job.tracker.begin(), second_args)
            .await
            .unwrap();

        assert_ne!(first.output_id, second.output_id);
        assert_eq!(outputs.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_logo_file_is_not_found() {
        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let args = generate_args(json!({
            "kind": "text",
            "fields": { "text": "hi" },
            "logoPath": "/definitely/not/here.png"
        }));

        let err = generate_qr(&job, &outputs, &config(), job.tracker.begin(), args)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(outputs.is_empty());
    }
}
