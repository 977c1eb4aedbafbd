//! # PDF Watermark Command
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  watermark_pdf { path: "report.pdf", mark: { type: "text", ... } }      │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  1. Read the PDF (and the mark image, if any)                  │    │
//! │  │  2. Stamp the selected pages on a blocking thread (lopdf)      │    │
//! │  │  3. Still current? write <stem>-watermarked.pdf : SUPERSEDED   │    │
//! │  │  4. Publish the bytes to the watermark slot                    │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  { outputId, path, fileName, pagesMarked: [1, 3], pageCount: 4 }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use quicktools_core::watermark::{
    watermarked_filename, PageSelection, WatermarkContent, WatermarkPosition, WatermarkSpec,
    DEFAULT_FONT_SIZE, DEFAULT_IMAGE_SCALE, DEFAULT_OPACITY, DEFAULT_TEXT_COLOR,
};
use quicktools_core::Rgb;
use quicktools_render::apply_watermark;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::publish;
use crate::error::ApiError;
use crate::state::{AppConfig, OutputRegistry, RenderJobState, RequestToken, StoredOutput};

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}

fn default_image_scale() -> f32 {
    DEFAULT_IMAGE_SCALE
}

fn default_text_color() -> Rgb {
    DEFAULT_TEXT_COLOR
}

/// The mark as the form describes it; images come from a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkArgs {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(default = "default_font_size")]
        font_size: f32,
        #[serde(default = "default_text_color")]
        color: Rgb,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        image_path: PathBuf,
        #[serde(default = "default_image_scale")]
        scale: f32,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkPdfArgs {
    pub path: PathBuf,
    pub mark: MarkArgs,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub position: WatermarkPosition,
    #[serde(default)]
    pub pages: PageSelection,
    /// Overrides the configured output folder.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkPdfResponse {
    pub output_id: String,
    pub path: PathBuf,
    pub file_name: String,
    pub pages_marked: Vec<u32>,
    pub page_count: u32,
}

/// Watermarks a PDF file and writes the copy to the output folder.
///
/// `token` comes from `job.tracker` when the request arrived.
pub async fn watermark_pdf(
    job: &RenderJobState,
    outputs: &OutputRegistry,
    config: &AppConfig,
    token: RequestToken,
    args: WatermarkPdfArgs,
) -> Result<WatermarkPdfResponse, ApiError> {
    debug!(path = ?args.path, pages = ?args.pages, "watermark_pdf command");

    let pdf = tokio::fs::read(&args.path).await?;

    let content = match args.mark {
        MarkArgs::Text {
            text,
            font_size,
            color,
        } => WatermarkContent::Text {
            text,
            font_size,
            color,
        },
        MarkArgs::Image { image_path, scale } => WatermarkContent::Image {
            data: tokio::fs::read(&image_path).await?,
            scale,
        },
    };
    let spec = WatermarkSpec {
        content,
        opacity: args.opacity,
        rotation: args.rotation,
        position: args.position,
        pages: args.pages,
    };

    let stamped = tokio::task::spawn_blocking(move || apply_watermark(&pdf, &spec)).await??;

    let _writing = job.files.lock().await;

    // Skip the write for a result nobody will see.
    if !job.tracker.is_current(token) {
        warn!(path = ?args.path, "Discarding superseded watermark result");
        return Err(ApiError::superseded("Watermark"));
    }

    let dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let file_name = watermarked_filename(&args.path.to_string_lossy());
    let path = dir.join(&file_name);
    let output_id = write_and_publish(job, outputs, token, &path, &file_name, stamped.bytes).await?;

    info!(
        %output_id,
        path = ?path,
        pages = stamped.pages_marked.len(),
        "PDF watermarked"
    );

    Ok(WatermarkPdfResponse {
        output_id: output_id.to_string(),
        path,
        file_name,
        pages_marked: stamped.pages_marked,
        page_count: stamped.page_count,
    })
}

/// Writes the file, then publishes it. A request superseded in between
/// removes its file again. Callers hold `job.files`.
async fn write_and_publish(
    job: &RenderJobState,
    outputs: &OutputRegistry,
    token: RequestToken,
    path: &Path,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<Uuid, ApiError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, &bytes).await?;

    let output = StoredOutput::new(bytes, "application/pdf", file_name).with_path(path.to_path_buf());

    match publish(job, outputs, token, output, "Watermark") {
        Ok(id) => Ok(id),
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!(path = ?path, "Could not remove superseded file: {}", e);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use serde_json::json;

    /// A document with `pages` empty A4 pages.
    fn create_test_pdf(pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for _ in 0..pages {
            let content = Content {
                operations: vec![Operation::new("re", vec![10.into(), 10.into(), 50.into(), 50.into()])],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            output_dir: dir.join("out"),
            history_limit: 10,
            default_qr_size: 300,
            log_filter: None,
        }
    }

    fn args(path: &std::path::Path, extra: serde_json::Value) -> WatermarkPdfArgs {
        let mut value = json!({
            "path": path,
            "mark": { "type": "text", "text": "DRAFT" },
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_writes_watermarked_copy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.pdf");
        std::fs::write(&input, create_test_pdf(4)).unwrap();

        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let response = watermark_pdf(
            &job,
            &outputs,
            &config(dir.path()),
            job.tracker.begin(),
            args(&input, json!({ "pages": { "type": "custom", "pages": "1,3" } })),
        )
        .await
        .unwrap();

        assert_eq!(response.file_name, "report-watermarked.pdf");
        assert_eq!(response.path, dir.path().join("out").join("report-watermarked.pdf"));
        assert_eq!(response.pages_marked, vec![1, 3]);
        assert_eq!(response.page_count, 4);

        let written = std::fs::read(&response.path).unwrap();
        let doc = Document::load_mem(&written).unwrap();
        assert_eq!(doc.get_pages().len(), 4);

        let stored = outputs.get(job.slot.current_id().unwrap()).unwrap();
        assert_eq!(stored.mime_type, "application/pdf");
        assert_eq!(stored.bytes.as_slice(), written.as_slice());
    }

    #[tokio::test]
    async fn test_invalid_opacity_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.pdf");
        std::fs::write(&input, create_test_pdf(1)).unwrap();

        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let err = watermark_pdf(
            &job,
            &outputs,
            &config(dir.path()),
            job.tracker.begin(),
            args(&input, json!({ "opacity": 1.5 })),
        )
        .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!dir.path().join("out").exists());
        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn test_not_a_pdf_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.pdf");
        std::fs::write(&input, b"just text").unwrap();

        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let token = job.tracker.begin();
        let err = watermark_pdf(&job, &outputs, &config(dir.path()), token, args(&input, json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RenderError);
    }

    #[tokio::test]
    async fn test_missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let err = watermark_pdf(
            &job,
            &outputs,
            &config(dir.path()),
            job.tracker.begin(),
            args(&dir.path().join("missing.pdf"), json!({})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_superseded_request_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.pdf");
        std::fs::write(&input, create_test_pdf(1)).unwrap();

        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let older = job.tracker.begin();
        job.tracker.begin();

        let err = watermark_pdf(&job, &outputs, &config(dir.path()), older, args(&input, json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Superseded);
        assert!(!dir.path().join("out").join("report-watermarked.pdf").exists());
        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn test_file_removed_when_superseded_during_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("a-watermarked.pdf");

        let job = RenderJobState::new();
        let outputs = OutputRegistry::new();
        let older = job.tracker.begin();
        // A newer request arrives after the current check passed.
        job.tracker.begin();

        let bytes = b"%PDF".to_vec();
        let err = write_and_publish(&job, &outputs, older, &path, "a-watermarked.pdf", bytes)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Superseded);
        assert!(!path.exists());
        assert!(outputs.is_empty());
        assert!(job.slot.current_id().is_none());
    }

    #[tokio::test]
    async fn test_mark_defaults() {
        let parsed = args(std::path::Path::new("x.pdf"), json!({}));
        assert_eq!(parsed.opacity, DEFAULT_OPACITY);
        assert_eq!(parsed.position, WatermarkPosition::Center);
        assert_eq!(parsed.pages, PageSelection::All);
        match parsed.mark {
            MarkArgs::Text { font_size, color, .. } => {
                assert_eq!(font_size, DEFAULT_FONT_SIZE);
                assert_eq!(color, DEFAULT_TEXT_COLOR);
            }
            other => panic!("unexpected mark {other:?}"),
        }
    }
}
