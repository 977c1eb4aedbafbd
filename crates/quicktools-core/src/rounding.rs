//! # Rounding Module
//!
//! Rounds a number by decimal places or significant figures under one of
//! five policies.
//!
//! ## Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  value 2.5, 0 places        value -2.5, 0 places                    │
//! │                                                                     │
//! │  Nearest  (half up)   3      Nearest  -2   (half toward +∞)         │
//! │  Bankers  (half even) 2      Bankers  -2                            │
//! │  Up       (ceiling)   3      Up       -2                            │
//! │  Down     (floor)     2      Down     -3                            │
//! │  Truncate             2      Truncate -2                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In significant-figure mode `Up` rounds away from zero and `Down`
//! toward zero, so the direction depends on the sign of the input.
//!
//! ## Floating point
//! `0.29 × 100` is `28.999999999999996` in binary floating point. When the
//! shortest decimal text of the input has no digits below the rounding
//! position (`0.29` at two places), the scaled value is snapped to its
//! integer before the policy is applied; otherwise `Down` would turn `0.29`
//! into `0.28` and rounding would not be idempotent. Inputs with digits
//! past that position are never snapped, so `Down` stays at or below the
//! input and `Up` at or above it.
//!
//! Values already integral at the requested scale (`|x × 10^places| ≥ 2^53`)
//! come back unchanged. Subnormal inputs are scaled in two steps so that
//! `10^exp` never overflows.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::validation::{validate_finite, validate_range};

/// Largest accepted decimal-place count.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// Largest accepted significant-figure count.
pub const MAX_SIGNIFICANT_FIGURES: u32 = 15;

// =============================================================================
// Settings
// =============================================================================

/// Rounding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    /// Round half up (`Math.round` semantics).
    Nearest,
    /// Round half to even.
    Bankers,
    /// Ceiling; away from zero for significant figures.
    Up,
    /// Floor; toward zero for significant figures.
    Down,
    /// Drop the extra digits.
    Truncate,
}

impl RoundingMethod {
    pub const ALL: [RoundingMethod; 5] = [
        RoundingMethod::Nearest,
        RoundingMethod::Bankers,
        RoundingMethod::Up,
        RoundingMethod::Down,
        RoundingMethod::Truncate,
    ];

    /// Display label used in the comparison table.
    pub fn label(&self) -> &'static str {
        match self {
            RoundingMethod::Nearest => "Round half up",
            RoundingMethod::Bankers => "Banker's rounding",
            RoundingMethod::Up => "Round up",
            RoundingMethod::Down => "Round down",
            RoundingMethod::Truncate => "Truncate",
        }
    }
}

/// What the precision count means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionType {
    Decimal,
    Significant,
}

/// A rounding request as submitted by the tool form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundingRequest {
    pub value: f64,
    pub method: RoundingMethod,
    pub precision_type: PrecisionType,
    pub precision: u32,
}

/// Result of a rounding request plus the comparison figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundingOutcome {
    pub original: f64,
    pub rounded: f64,
    /// `rounded` written with exactly the requested precision.
    pub formatted: String,
    /// `rounded − original`.
    pub difference: f64,
    /// `difference / original × 100`; `None` when the original is zero.
    pub percentage: Option<f64>,
}

impl RoundingOutcome {
    /// Percentage for display; "N/A" when undefined.
    pub fn percentage_label(&self) -> String {
        match self.percentage {
            Some(p) => format!("{:.4}%", p),
            None => "N/A".to_string(),
        }
    }
}

/// One row of the method comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MethodComparison {
    pub method: RoundingMethod,
    pub label: String,
    pub rounded: f64,
    pub formatted: String,
}

// =============================================================================
// Scaling Helpers
// =============================================================================

/// Largest power of ten below `f64::MAX`.
const MAX_POW10: i32 = 308;

/// 2^53: from here on every `f64` is an integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Multiplies by `10^exp` without building inexact negative powers.
/// Shifts past `10^308` go in two steps.
fn scale(x: f64, exp: i32) -> f64 {
    if exp.abs() > MAX_POW10 {
        let half = exp / 2;
        return scale(scale(x, half), exp - half);
    }
    if exp >= 0 {
        x * 10f64.powi(exp)
    } else {
        x / 10f64.powi(-exp)
    }
}

fn unscale(x: f64, exp: i32) -> f64 {
    scale(x, -exp)
}

fn tolerance(scaled: f64) -> f64 {
    8.0 * f64::EPSILON * scaled.abs().max(1.0)
}

/// Exponent of the last digit in the shortest decimal text of `x`:
/// `-2` for `0.29`, `2` for `12300`.
fn lowest_digit_exp(x: f64) -> i32 {
    let text = format!("{:e}", x.abs());
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let fraction_len = mantissa.split_once('.').map_or(0, |(_, f)| f.len()) as i32;
    exponent - fraction_len
}

/// Snaps `scaled = x × 10^exp` onto its integer when the decimal text of
/// `x` ends at or above `10^-exp`.
fn snap(x: f64, exp: i32, scaled: f64) -> f64 {
    if lowest_digit_exp(x) + exp >= 0 {
        scaled.round()
    } else {
        scaled
    }
}

/// Scales `x` by `10^exp`, applies `policy` and scales back.
fn round_at(x: f64, exp: i32, policy: impl Fn(f64) -> f64) -> f64 {
    let scaled = scale(x, exp);
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return x;
    }
    normalize_zero(unscale(policy(snap(x, exp, scaled)), exp))
}

fn half_to_even(scaled: f64) -> f64 {
    let floor = scaled.floor();
    let diff = scaled - floor;
    if (diff - 0.5).abs() <= tolerance(scaled) {
        if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    }
}

/// Order of magnitude of a non-zero finite value: `floor(log10 |x|)`,
/// corrected for `log10` landing just below an exact power of ten.
fn magnitude(x: f64) -> i32 {
    let abs = x.abs();
    let mut m = abs.log10().floor() as i32;
    if scale(1.0, m + 1) <= abs {
        m += 1;
    } else if scale(1.0, m) > abs {
        m -= 1;
    }
    m
}

fn normalize_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

// =============================================================================
// Rounding
// =============================================================================

/// Rounds `x` to `places` digits after the decimal point.
///
/// ## Example
/// ```rust
/// use quicktools_core::rounding::{round_decimal, RoundingMethod};
///
/// assert_eq!(round_decimal(123.456789, 2, RoundingMethod::Truncate), 123.45);
/// assert_eq!(round_decimal(123.456789, 2, RoundingMethod::Nearest), 123.46);
/// assert_eq!(round_decimal(3.5, 0, RoundingMethod::Bankers), 4.0);
/// ```
pub fn round_decimal(x: f64, places: u32, method: RoundingMethod) -> f64 {
    round_at(x, places as i32, |scaled| match method {
        RoundingMethod::Nearest => (scaled + 0.5).floor(),
        RoundingMethod::Bankers => half_to_even(scaled),
        RoundingMethod::Up => scaled.ceil(),
        RoundingMethod::Down => scaled.floor(),
        RoundingMethod::Truncate => scaled.trunc(),
    })
}

/// Rounds `x` to `figures` significant figures.
///
/// ## Example
/// ```rust
/// use quicktools_core::rounding::{round_significant, RoundingMethod};
///
/// assert_eq!(round_significant(12345.0, 2, RoundingMethod::Nearest), 12000.0);
/// assert_eq!(round_significant(-0.012345, 3, RoundingMethod::Up), -0.0124);
/// assert_eq!(round_significant(0.0, 3, RoundingMethod::Up), 0.0);
/// ```
pub fn round_significant(x: f64, figures: u32, method: RoundingMethod) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    let exp = figures as i32 - magnitude(x) - 1;
    round_at(x, exp, |scaled| match method {
        RoundingMethod::Nearest => (scaled + 0.5).floor(),
        RoundingMethod::Bankers => half_to_even(scaled),
        RoundingMethod::Up => {
            if x >= 0.0 {
                scaled.ceil()
            } else {
                scaled.floor()
            }
        }
        RoundingMethod::Down | RoundingMethod::Truncate => scaled.trunc(),
    })
}

/// Rounds under the given precision type.
pub fn round_value(x: f64, precision_type: PrecisionType, precision: u32, method: RoundingMethod) -> f64 {
    match precision_type {
        PrecisionType::Decimal => round_decimal(x, precision, method),
        PrecisionType::Significant => round_significant(x, precision, method),
    }
}

/// [`round_value`] for request handling: a result past `f64::MAX` (rounding
/// up next to it) is an error.
fn round_finite(
    x: f64,
    precision_type: PrecisionType,
    precision: u32,
    method: RoundingMethod,
) -> CoreResult<f64> {
    let rounded = round_value(x, precision_type, precision, method);
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(ValidationError::invalid_format("value", "rounds past the largest representable number")
            .into())
    }
}

/// Writes an already-rounded value with exactly the requested precision.
///
/// ## Example
/// ```rust
/// use quicktools_core::rounding::{format_rounded, PrecisionType};
///
/// assert_eq!(format_rounded(2.5, PrecisionType::Decimal, 3), "2.500");
/// assert_eq!(format_rounded(0.0124, PrecisionType::Significant, 3), "0.0124");
/// assert_eq!(format_rounded(10.0, PrecisionType::Significant, 3), "10.0");
/// ```
pub fn format_rounded(value: f64, precision_type: PrecisionType, precision: u32) -> String {
    let value = normalize_zero(value);
    let decimals = match precision_type {
        PrecisionType::Decimal => precision as usize,
        PrecisionType::Significant if value == 0.0 => precision.saturating_sub(1) as usize,
        PrecisionType::Significant => (precision as i32 - 1 - magnitude(value)).max(0) as usize,
    };
    format!("{:.*}", decimals, value)
}

/// Validates the precision count for its type.
pub fn validate_precision(precision_type: PrecisionType, precision: u32) -> CoreResult<()> {
    match precision_type {
        PrecisionType::Decimal => validate_range(
            "decimal places",
            precision as i64,
            0,
            MAX_DECIMAL_PLACES as i64,
        )?,
        PrecisionType::Significant => validate_range(
            "significant figures",
            precision as i64,
            1,
            MAX_SIGNIFICANT_FIGURES as i64,
        )?,
    }
    Ok(())
}

/// Runs a full rounding request: validation, rounding, formatting and the
/// difference/percentage comparison.
///
/// ## Example
/// ```rust
/// use quicktools_core::rounding::*;
///
/// let outcome = round_number(RoundingRequest {
///     value: 0.0,
///     method: RoundingMethod::Up,
///     precision_type: PrecisionType::Decimal,
///     precision: 2,
/// })
/// .unwrap();
/// assert_eq!(outcome.formatted, "0.00");
/// assert_eq!(outcome.percentage_label(), "N/A");
/// ```
pub fn round_number(request: RoundingRequest) -> CoreResult<RoundingOutcome> {
    let original = validate_finite("value", request.value)?;
    validate_precision(request.precision_type, request.precision)?;

    let rounded = round_finite(
        original,
        request.precision_type,
        request.precision,
        request.method,
    )?;
    let difference = rounded - original;
    let percentage = if original == 0.0 {
        None
    } else {
        Some(difference / original * 100.0)
    };

    Ok(RoundingOutcome {
        original,
        rounded,
        formatted: format_rounded(rounded, request.precision_type, request.precision),
        difference,
        percentage,
    })
}

/// Rounds `x` under every method for the comparison table.
pub fn compare_methods(
    x: f64,
    precision_type: PrecisionType,
    precision: u32,
) -> CoreResult<Vec<MethodComparison>> {
    let x = validate_finite("value", x)?;
    validate_precision(precision_type, precision)?;

    RoundingMethod::ALL
        .iter()
        .map(|&method| {
            let rounded = round_finite(x, precision_type, precision, method)?;
            Ok(MethodComparison {
                method,
                label: method.label().to_string(),
                rounded,
                formatted: format_rounded(rounded, precision_type, precision),
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bankers_tie_break() {
        assert_eq!(round_decimal(2.5, 0, RoundingMethod::Bankers), 2.0);
        assert_eq!(round_decimal(3.5, 0, RoundingMethod::Bankers), 4.0);
        assert_eq!(round_decimal(-2.5, 0, RoundingMethod::Bankers), -2.0);
        assert_eq!(round_decimal(0.125, 2, RoundingMethod::Bankers), 0.12);
        assert_eq!(round_decimal(2.6, 0, RoundingMethod::Bankers), 3.0);
    }

    #[test]
    fn test_truncate_vs_nearest() {
        assert_eq!(round_decimal(123.456789, 2, RoundingMethod::Truncate), 123.45);
        assert_eq!(round_decimal(123.456789, 2, RoundingMethod::Nearest), 123.46);
    }

    #[test]
    fn test_decimal_directions() {
        assert_eq!(round_decimal(-2.5, 0, RoundingMethod::Nearest), -2.0);
        assert_eq!(round_decimal(1.21, 1, RoundingMethod::Up), 1.3);
        assert_eq!(round_decimal(-1.21, 1, RoundingMethod::Up), -1.2);
        assert_eq!(round_decimal(-1.21, 1, RoundingMethod::Down), -1.3);
        assert_eq!(round_decimal(-1.29, 1, RoundingMethod::Truncate), -1.2);
    }

    #[test]
    fn test_float_noise_does_not_move_exact_values() {
        assert_eq!(round_decimal(0.29, 2, RoundingMethod::Down), 0.29);
        assert_eq!(round_decimal(0.29, 2, RoundingMethod::Up), 0.29);
        assert_eq!(round_decimal(1.1, 1, RoundingMethod::Up), 1.1);
    }

    #[test]
    fn test_directional_rounding_stays_on_its_side() {
        let x = 0.9999999999999999;
        assert_eq!(round_decimal(x, 0, RoundingMethod::Down), 0.0);
        assert_eq!(round_decimal(x, 0, RoundingMethod::Truncate), 0.0);
        assert_eq!(round_decimal(-x, 0, RoundingMethod::Up), 0.0);
        assert_eq!(round_significant(x, 1, RoundingMethod::Down), 0.9);
        assert_eq!(round_decimal(x, 0, RoundingMethod::Up), 1.0);
    }

    #[test]
    fn test_values_integral_at_scale_are_unchanged() {
        assert_eq!(round_decimal(1e300, 15, RoundingMethod::Nearest), 1e300);
        assert_eq!(round_decimal(-1e300, 15, RoundingMethod::Down), -1e300);
        assert_eq!(round_decimal(f64::MAX, 2, RoundingMethod::Up), f64::MAX);
        let big = 2f64.powi(60) + 4096.0;
        assert_eq!(round_decimal(big, 1, RoundingMethod::Up), big);
    }

    #[test]
    fn test_subnormal_significant_figures() {
        let rounded = round_significant(1e-310, 3, RoundingMethod::Nearest);
        assert!(rounded.is_finite());
        assert!((rounded / 1e-310 - 1.0).abs() < 1e-9);

        let rounded = round_significant(1.23456e-310, 3, RoundingMethod::Nearest);
        assert!((rounded / 1.23e-310 - 1.0).abs() < 1e-9);

        let smallest = f64::from_bits(1);
        assert!(round_significant(smallest, 2, RoundingMethod::Nearest).is_finite());
    }

    #[test]
    fn test_round_number_extremes() {
        let request = |value, precision_type, precision| RoundingRequest {
            value,
            method: RoundingMethod::Nearest,
            precision_type,
            precision,
        };

        let outcome = round_number(request(1e-310, PrecisionType::Significant, 3)).unwrap();
        assert!(outcome.rounded.is_finite());
        assert!(!outcome.formatted.contains("NaN"));

        let outcome = round_number(request(1e300, PrecisionType::Decimal, 15)).unwrap();
        assert_eq!(outcome.rounded, 1e300);
        assert_eq!(outcome.difference, 0.0);
        assert_eq!(outcome.percentage, Some(0.0));

        // The next significant figure up from f64::MAX does not exist.
        let up = RoundingRequest {
            method: RoundingMethod::Up,
            ..request(f64::MAX, PrecisionType::Significant, 1)
        };
        assert!(round_number(up).is_err());
        assert!(compare_methods(f64::MAX, PrecisionType::Significant, 1).is_err());
    }

    #[test]
    fn test_significant_figures() {
        assert_eq!(round_significant(12345.0, 2, RoundingMethod::Nearest), 12000.0);
        assert_eq!(round_significant(0.0012345, 2, RoundingMethod::Nearest), 0.0012);
        assert_eq!(round_significant(1234.5, 3, RoundingMethod::Truncate), 1230.0);
        assert_eq!(round_significant(1000.0, 1, RoundingMethod::Up), 1000.0);
    }

    #[test]
    fn test_significant_up_down_are_sign_aware() {
        assert_eq!(round_significant(1.21, 2, RoundingMethod::Up), 1.3);
        assert_eq!(round_significant(-1.21, 2, RoundingMethod::Up), -1.3);
        assert_eq!(round_significant(1.29, 2, RoundingMethod::Down), 1.2);
        assert_eq!(round_significant(-1.29, 2, RoundingMethod::Down), -1.2);
    }

    #[test]
    fn test_significant_zero() {
        assert_eq!(round_significant(0.0, 4, RoundingMethod::Nearest), 0.0);
        assert_eq!(format_rounded(0.0, PrecisionType::Significant, 3), "0.00");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_rounded(123.4, PrecisionType::Decimal, 2), "123.40");
        assert_eq!(format_rounded(12000.0, PrecisionType::Significant, 2), "12000");
        assert_eq!(format_rounded(-0.0, PrecisionType::Decimal, 1), "0.0");
        assert_eq!(format_rounded(9.99, PrecisionType::Significant, 3), "9.99");
    }

    #[test]
    fn test_round_number_comparison() {
        let outcome = round_number(RoundingRequest {
            value: 2.5,
            method: RoundingMethod::Nearest,
            precision_type: PrecisionType::Decimal,
            precision: 0,
        })
        .unwrap();
        assert_eq!(outcome.rounded, 3.0);
        assert_eq!(outcome.formatted, "3");
        assert_eq!(outcome.difference, 0.5);
        assert_eq!(outcome.percentage, Some(20.0));
    }

    #[test]
    fn test_round_number_validation() {
        let base = RoundingRequest {
            value: 1.0,
            method: RoundingMethod::Nearest,
            precision_type: PrecisionType::Decimal,
            precision: 2,
        };
        assert!(round_number(RoundingRequest { value: f64::NAN, ..base }).is_err());
        assert!(round_number(RoundingRequest { value: f64::INFINITY, ..base }).is_err());
        assert!(round_number(RoundingRequest { precision: 16, ..base }).is_err());
        assert!(round_number(RoundingRequest {
            precision_type: PrecisionType::Significant,
            precision: 0,
            ..base
        })
        .is_err());
    }

    #[test]
    fn test_compare_methods_covers_all() {
        let rows = compare_methods(2.5, PrecisionType::Decimal, 0).unwrap();
        let values: Vec<f64> = rows.iter().map(|r| r.rounded).collect();
        assert_eq!(values, vec![3.0, 2.0, 3.0, 2.0, 2.0]);
    }

    proptest! {
        #[test]
        fn prop_decimal_rounding_is_idempotent(
            x in -1.0e6f64..1.0e6,
            places in 0u32..=6,
            idx in 0usize..5,
        ) {
            let method = RoundingMethod::ALL[idx];
            let once = round_decimal(x, places, method);
            prop_assert_eq!(round_decimal(once, places, method), once);
        }

        #[test]
        fn prop_significant_rounding_is_idempotent(
            x in -1.0e6f64..1.0e6,
            figures in 1u32..=8,
            idx in 0usize..5,
        ) {
            let method = RoundingMethod::ALL[idx];
            let once = round_significant(x, figures, method);
            prop_assert_eq!(round_significant(once, figures, method), once);
        }

        #[test]
        fn prop_decimal_format_has_exact_places(x in -1.0e6f64..1.0e6, places in 0u32..=6) {
            let rounded = round_decimal(x, places, RoundingMethod::Nearest);
            let text = format_rounded(rounded, PrecisionType::Decimal, places);
            let after_point = text.split('.').nth(1).map(str::len).unwrap_or(0);
            prop_assert_eq!(after_point, places as usize);
        }
    }
}
