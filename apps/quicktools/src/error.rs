//! # API Error Type
//!
//! Unified error type for IPC commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Quicktools                             │
//! │                                                                         │
//! │  Front end                   Rust Backend                               │
//! │  ─────────                   ────────────                               │
//! │                                                                         │
//! │  {"command":"convert_base"}                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Render Error? ─── RenderError::Pdf("...") ────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Bad Input? ─── CoreError::InvalidDigits ───────► ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  {"id":7,"ok":false,"error":{                                           │
//! │      "code":"INVALID_INPUT",                                            │
//! │      "message":"Invalid input '1G' for base 16. Valid characters: ..."} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quicktools_core::{CoreError, ValidationError};
use quicktools_render::RenderError;
use serde::Serialize;

/// API error returned from commands.
///
/// ## Serialization
/// This is what the front end receives when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Output not found: 1b4e28ba-2fa1-11d2-883f-0016d3cca427"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Front end
/// ```typescript
/// const res = await ipc('generate_qr', args);
/// if (!res.ok) {
///   switch (res.error.code) {
///     case 'SUPERSEDED':
///       return; // a newer request already owns the preview
///     case 'VALIDATION_ERROR':
///       showForm(res.error.message);
///       break;
///     default:
///       showError(res.error.message);
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A field failed validation (missing, too long, out of range)
    ValidationError,

    /// Input text cannot be interpreted (bad digits, overflow)
    InvalidInput,

    /// QR, image or PDF processing failed
    RenderError,

    /// Reading or writing a file failed
    IoError,

    /// Output or file not found
    NotFound,

    /// A newer request for the same tool finished the job instead
    Superseded,

    /// The request line itself is malformed
    BadRequest,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    /// A result that finished after a newer request for `tool` started.
    pub fn superseded(tool: &str) -> Self {
        ApiError::new(
            ErrorCode::Superseded,
            format!("{} request superseded by a newer one", tool),
        )
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDigits { .. } | CoreError::Overflow { .. } => {
                ApiError::new(ErrorCode::InvalidInput, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts render errors to API errors.
impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Core(e) => e.into(),
            RenderError::Image(e) => {
                tracing::error!("Image processing failed: {}", e);
                ApiError::new(ErrorCode::RenderError, "Could not process the image")
            }
            other => {
                tracing::error!("Render failed: {}", other);
                ApiError::new(ErrorCode::RenderError, other.to_string())
            }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ApiError::new(ErrorCode::NotFound, "File not found"),
            _ => {
                tracing::error!("I/O failed: {}", err);
                ApiError::new(ErrorCode::IoError, format!("File operation failed: {}", err))
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Background task failed: {}", err);
        ApiError::internal("Background task failed")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktools_core::base;

    #[test]
    fn test_invalid_digits_maps_to_invalid_input() {
        let err: ApiError = base::to_decimal("1G", 16).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("0123456789ABCDEF"));
    }

    #[test]
    fn test_validation_inside_render_error_stays_validation() {
        let err: ApiError = RenderError::Core(CoreError::Validation(ValidationError::Required {
            field: "payload".to_string(),
        }))
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "payload is required");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err: ApiError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::superseded("QR")).unwrap();
        assert_eq!(json["code"], "SUPERSEDED");
        assert_eq!(json["message"], "QR request superseded by a newer one");
    }
}
