//! # Base Conversion Module
//!
//! Converts non-negative integers between numeral bases 2 through 36.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "FF" (base 16) ──► base 2                                              │
//! │                                                                         │
//! │  1. Validate: every char ∈ charset(16) = "0123456789ABCDEF"            │
//! │                                                                         │
//! │  2. To decimal (positional weighted sum):                               │
//! │       F×16¹ + F×16⁰ = 240 + 15 = 255                                    │
//! │                                                                         │
//! │  3. From decimal (repeated division, remainders prepended):             │
//! │       255 % 2 = 1, 127 % 2 = 1, ... , 1 % 2 = 1  →  "11111111"          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The intermediate is a `u128`; inputs whose value does not fit are
//! rejected with [`CoreError::Overflow`] rather than silently losing
//! precision. Signs and fractional digits are not part of any charset and
//! therefore fail validation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_base;

/// Digit alphabet shared by every base: digits then uppercase letters.
pub const DIGITS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the valid characters for `base`: the first `base` chars of [`DIGITS`].
///
/// ## Example
/// ```rust
/// use quicktools_core::base::charset;
///
/// assert_eq!(charset(2).unwrap(), "01");
/// assert_eq!(charset(16).unwrap(), "0123456789ABCDEF");
/// assert!(charset(37).is_err());
/// ```
pub fn charset(base: u32) -> Result<&'static str, ValidationError> {
    validate_base(base)?;
    Ok(&DIGITS[..base as usize])
}

/// Value of a single digit, case-insensitive, if it belongs to `base`.
fn digit_value(c: char, base: u32) -> Option<u32> {
    c.to_digit(36).filter(|d| *d < base)
}

/// Validates `input` against the digit set of `base` and returns it
/// trimmed and uppercased.
pub fn validate_digits(input: &str, base: u32) -> CoreResult<String> {
    let valid = charset(base)?;
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::required("input").into());
    }

    if input.chars().any(|c| digit_value(c, base).is_none()) {
        return Err(CoreError::InvalidDigits {
            input: input.to_string(),
            base,
            charset: valid.to_string(),
        });
    }

    Ok(input.to_ascii_uppercase())
}

/// Parses `input` written in `base` into its integer value.
///
/// ## Example
/// ```rust
/// use quicktools_core::base::to_decimal;
///
/// assert_eq!(to_decimal("FF", 16).unwrap(), 255);
/// assert_eq!(to_decimal("ff", 16).unwrap(), 255);
/// assert_eq!(to_decimal("Z", 36).unwrap(), 35);
/// assert!(to_decimal("2", 2).is_err());
/// ```
pub fn to_decimal(input: &str, base: u32) -> CoreResult<u128> {
    let digits = validate_digits(input, base)?;
    let radix = base as u128;

    // Horner form of Σ digit × base^position
    digits.chars().try_fold(0u128, |acc, c| {
        let d = digit_value(c, base).unwrap_or_default() as u128;
        acc.checked_mul(radix)
            .and_then(|v| v.checked_add(d))
            .ok_or_else(|| CoreError::Overflow {
                input: digits.clone(),
            })
    })
}

/// Writes `value` in `base`. Zero is `"0"`.
///
/// ## Example
/// ```rust
/// use quicktools_core::base::from_decimal;
///
/// assert_eq!(from_decimal(255, 2).unwrap(), "11111111");
/// assert_eq!(from_decimal(255, 16).unwrap(), "FF");
/// assert_eq!(from_decimal(0, 7).unwrap(), "0");
/// ```
pub fn from_decimal(value: u128, base: u32) -> CoreResult<String> {
    let alphabet = charset(base)?.as_bytes();
    if value == 0 {
        return Ok("0".to_string());
    }

    let radix = base as u128;
    let mut n = value;
    let mut out = Vec::new();
    while n > 0 {
        out.push(alphabet[(n % radix) as usize]);
        n /= radix;
    }
    out.reverse();

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Converts `input` from base `from` to base `to`.
///
/// Identical bases return the validated, uppercased input unchanged
/// (leading zeros included).
///
/// ## Example
/// ```rust
/// use quicktools_core::base::convert;
///
/// assert_eq!(convert("FF", 16, 2).unwrap(), "11111111");
/// assert_eq!(convert("777", 8, 10).unwrap(), "511");
/// assert_eq!(convert("00ff", 16, 16).unwrap(), "00FF");
/// ```
pub fn convert(input: &str, from: u32, to: u32) -> CoreResult<String> {
    validate_base(to)?;
    let digits = validate_digits(input, from)?;

    if from == to {
        return Ok(digits);
    }

    from_decimal(to_decimal(&digits, from)?, to)
}

/// The same value in the four bases most people ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommonBases {
    pub binary: String,
    pub octal: String,
    pub decimal: String,
    pub hexadecimal: String,
}

/// Converts `input` from base `from` into binary, octal, decimal and hex.
pub fn convert_common(input: &str, from: u32) -> CoreResult<CommonBases> {
    let value = to_decimal(input, from)?;
    Ok(CommonBases {
        binary: from_decimal(value, 2)?,
        octal: from_decimal(value, 8)?,
        decimal: value.to_string(),
        hexadecimal: from_decimal(value, 16)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
