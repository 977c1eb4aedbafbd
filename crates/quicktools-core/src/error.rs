//! # Error Types
//!
//! Domain-specific error types for quicktools-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quicktools-core errors (this file)                                    │
//! │  ├── CoreError        - Tool logic failures                            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quicktools-render errors (separate crate)                             │
//! │  └── RenderError      - QR / image / PDF library failures              │
//! │                                                                         │
//! │  IPC errors (in app)                                                   │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RenderError → ApiError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (input, base, field)
//! 3. Errors are enum variants, never String
//! 4. Division by zero is NOT an error (see `calculator::Notice`)

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Tool logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input contains characters outside the source base's digit set.
    ///
    /// ## User Workflow
    /// ```text
    /// Input "1G" in base 16
    ///      │
    ///      ▼
    /// validate_digits("1G", 16)
    ///      │
    ///      ▼
    /// InvalidDigits { input: "1G", base: 16, charset: "0123456789ABCDEF" }
    ///      │
    ///      ▼
    /// UI shows: "Invalid input for base 16. Valid characters: 0123456789ABCDEF"
    /// ```
    #[error("Invalid input '{input}' for base {base}. Valid characters: {charset}")]
    InvalidDigits {
        input: String,
        base: u32,
        charset: String,
    },

    /// The value does not fit the integer intermediate.
    #[error("'{input}' is too large to convert")]
    Overflow { input: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before tool logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Number is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., unparsable number, bad color, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_digits_message_names_charset() {
        let err = CoreError::InvalidDigits {
            input: "1G".to_string(),
            base: 16,
            charset: "0123456789ABCDEF".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input '1G' for base 16. Valid characters: 0123456789ABCDEF"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("ssid");
        assert_eq!(err.to_string(), "ssid is required");

        let err = ValidationError::OutOfRange {
            field: "base".to_string(),
            min: 2,
            max: 36,
        };
        assert_eq!(err.to_string(), "base must be between 2 and 36");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("input").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
