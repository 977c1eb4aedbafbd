//! # Validation Module
//!
//! Input validation utilities shared by the tools.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  ├── Input masks (digits only, min/max on sliders)                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: IPC command (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: range, format and finiteness checks                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Tool logic                                                   │
//! │  └── Domain checks (base digit sets, overflow)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quicktools_core::validation::{parse_finite, validate_base};
//!
//! validate_base(16).unwrap();
//! assert_eq!(parse_finite("value", " 3.25 ").unwrap(), 3.25);
//! ```

use crate::error::ValidationError;
use crate::{MAX_BASE, MIN_BASE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Requires a non-blank value and returns it trimmed.
///
/// ## Example
/// ```rust
/// use quicktools_core::validation::require;
///
/// assert_eq!(require("ssid", "  Home  ").unwrap(), "Home");
/// assert!(require("ssid", "   ").is_err());
/// ```
pub fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value)
}

/// Requires an optional field to be present and non-blank.
pub fn require_opt<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    require(field, value.unwrap_or(""))
}

/// Rejects values longer than `max` characters.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a numeral base.
///
/// ## Rules
/// - Must be between 2 and 36 (digits `0-9` then letters `A-Z`)
pub fn validate_base(base: u32) -> ValidationResult<()> {
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(ValidationError::OutOfRange {
            field: "base".to_string(),
            min: MIN_BASE as i64,
            max: MAX_BASE as i64,
        });
    }
    Ok(())
}

/// Validates an integer against an inclusive range.
pub fn validate_range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// Rejects NaN and infinities.
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Parses user-entered text into a finite number.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Empty text is a `Required` error
/// - `inf`, `NaN` and friends are rejected even though `f64::from_str`
///   accepts them
///
/// ## Example
/// ```rust
/// use quicktools_core::validation::parse_finite;
///
/// assert_eq!(parse_finite("value", "-12.5").unwrap(), -12.5);
/// assert!(parse_finite("value", "abc").is_err());
/// assert!(parse_finite("value", "inf").is_err());
/// ```
pub fn parse_finite(field: &str, text: &str) -> ValidationResult<f64> {
    let text = require(field, text)?;
    let value: f64 = text
        .parse()
        .map_err(|_| ValidationError::invalid_format(field, "must be a number"))?;
    validate_finite(field, value)
}

/// Validates a fraction in `0.0..=1.0` (opacity and similar).
pub fn validate_unit_interval(field: &str, value: f32) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 1,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require("name", " Ada ").unwrap(), "Ada");
        assert!(require("name", "").is_err());
        assert!(require_opt("name", None).is_err());
        assert_eq!(require_opt("name", Some("x")).unwrap(), "x");
    }

    #[test]
    fn test_validate_base() {
        assert!(validate_base(2).is_ok());
        assert!(validate_base(36).is_ok());
        assert!(validate_base(1).is_err());
        assert!(validate_base(37).is_err());
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite("value", "42").unwrap(), 42.0);
        assert_eq!(parse_finite("value", "  1e3 ").unwrap(), 1000.0);
        assert!(parse_finite("value", "").is_err());
        assert!(parse_finite("value", "12a").is_err());
        assert!(parse_finite("value", "NaN").is_err());
        assert!(parse_finite("value", "-inf").is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(validate_unit_interval("opacity", 0.0).is_ok());
        assert!(validate_unit_interval("opacity", 0.5).is_ok());
        assert!(validate_unit_interval("opacity", 1.0).is_ok());
        assert!(validate_unit_interval("opacity", 1.5).is_err());
        assert!(validate_unit_interval("opacity", f32::NAN).is_err());
    }

    #[test]
    fn test_validate_max_len() {
        assert!(validate_max_len("text", "abc", 3).is_ok());
        assert!(validate_max_len("text", "abcd", 3).is_err());
    }
}
