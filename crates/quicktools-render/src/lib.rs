//! # quicktools-render: Rendering Layer for Quicktools
//!
//! Turns the pure values produced by `quicktools-core` into bytes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quicktools Data Flow                             │
//! │                                                                         │
//! │  IPC command (generate_qr, watermark_pdf)                              │
//! │       │  spawn_blocking                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                quicktools-render (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │      qr       │    │    payload    │    │  watermark   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ qrcode grid   │    │ decode        │    │ lopdf load   │  │   │
//! │  │   │ → RGBA canvas │    │ → ≤600px      │    │ → overlay    │  │   │
//! │  │   │ → logo plate  │    │ → JPEG q60    │    │ → save       │  │   │
//! │  │   │ → PNG         │    │ → data URL    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Bytes handed back to the app's OutputRegistry                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`qr`] - QR rasterization and logo compositing
//! - [`payload`] - Image preparation for image QR codes
//! - [`watermark`] - PDF watermark overlay
//! - [`fonts`] - Standard Helvetica metrics
//! - [`error`] - Render error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quicktools_core::qr::QrStyle;
//! use quicktools_render::render_qr;
//!
//! let rendered = render_qr("https://example.com", &QrStyle::default(), None)?;
//! std::fs::write("qr.png", &rendered.png)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fonts;
pub mod payload;
pub mod qr;
pub mod watermark;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{RenderError, RenderResult};
pub use payload::prepare_image_payload;
pub use qr::{render_qr, RenderedQr};
pub use watermark::{apply_watermark, WatermarkOutput};

/// Encodes `bytes` as a base64 data URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
