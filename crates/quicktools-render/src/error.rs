//! # Render Error Types
//!
//! Error types for QR, image and PDF rendering.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Library error (QrError, ImageError, lopdf::Error)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RenderError (this module) ← Adds categorization                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in app) ← Serialized for the front end                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quicktools_core::{CoreError, ValidationError};
use thiserror::Error;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The payload could not be encoded as a QR code.
    ///
    /// ## When This Occurs
    /// - Payload longer than the largest QR version holds
    #[error("QR encoding failed: {0}")]
    Qr(String),

    /// An uploaded or generated image could not be processed.
    ///
    /// ## When This Occurs
    /// - Unsupported or corrupt image bytes
    /// - Encoder failure
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// The PDF could not be read, edited or written.
    ///
    /// ## When This Occurs
    /// - Not a PDF, or damaged beyond repair
    /// - Encrypted document
    /// - Page tree without usable page dictionaries
    #[error("PDF processing failed: {0}")]
    Pdf(String),

    /// Input rejected by the tool logic.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ValidationError> for RenderError {
    fn from(err: ValidationError) -> Self {
        RenderError::Core(CoreError::Validation(err))
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<qrcode::types::QrError> for RenderError {
    fn from(err: qrcode::types::QrError) -> Self {
        RenderError::Qr(err.to_string())
    }
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
