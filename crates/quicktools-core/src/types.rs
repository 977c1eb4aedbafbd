//! # Domain Types
//!
//! Records and small value types shared across the tools.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Records                                 │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                 │
//! │  │  ConversionRecord   │        │   RoundingRecord    │                 │
//! │  │  ─────────────────  │        │  ─────────────────  │                 │
//! │  │  id (UUID)          │        │  id (UUID)          │                 │
//! │  │  input              │        │  input              │                 │
//! │  │  from_base/to_base  │        │  method, precision  │                 │
//! │  │  result             │        │  result, formatted  │                 │
//! │  └─────────┬───────────┘        └─────────┬───────────┘                 │
//! │            │ created on each success      │                             │
//! │            ▼                              ▼                             │
//! │     BoundedHistory (10, newest first, discarded with the session)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::rounding::{PrecisionType, RoundingMethod, RoundingOutcome, RoundingRequest};

// =============================================================================
// Color
// =============================================================================

/// An sRGB color parsed from `#RRGGBB` (or `#RGB`) notation.
///
/// Serialized as the `#RRGGBB` string; exported types use
/// `#[ts(as = "String")]` on `Rgb` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parses a hex color.
    ///
    /// ## Example
    /// ```rust
    /// use quicktools_core::types::Rgb;
    ///
    /// assert_eq!(Rgb::from_hex("#FF8000").unwrap(), Rgb { r: 255, g: 128, b: 0 });
    /// assert_eq!(Rgb::from_hex("fff").unwrap(), Rgb::WHITE);
    /// assert!(Rgb::from_hex("#12345").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => {
                return Err(ValidationError::invalid_format(
                    "color",
                    "expected #RGB or #RRGGBB",
                ))
            }
        };

        let channel = |i: usize| {
            expanded
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ValidationError::invalid_format("color", "not a hex color"))
        };

        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Channels as `0.0..=1.0` fractions (PDF color operators).
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ValidationError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&hex)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

// =============================================================================
// Conversion Record
// =============================================================================

/// A successful base conversion.
///
/// Invariant: every char of `result` belongs to the charset of `to_base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub id: String,
    pub input: String,
    pub from_base: u32,
    pub to_base: u32,
    pub result: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(input: impl Into<String>, from_base: u32, to_base: u32, result: String) -> Self {
        ConversionRecord {
            id: Uuid::new_v4().to_string(),
            input: input.into(),
            from_base,
            to_base,
            result,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Rounding Record
// =============================================================================

/// A successful rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundingRecord {
    pub id: String,
    pub input: f64,
    pub method: RoundingMethod,
    pub precision_type: PrecisionType,
    pub precision: u32,
    pub result: f64,
    pub formatted: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl RoundingRecord {
    pub fn new(request: &RoundingRequest, outcome: &RoundingOutcome) -> Self {
        RoundingRecord {
            id: Uuid::new_v4().to_string(),
            input: request.value,
            method: request.method,
            precision_type: request.precision_type,
            precision: request.precision,
            result: outcome.rounded,
            formatted: outcome.formatted.clone(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_round_trips_through_display() {
        let color = Rgb::from_hex("#1a2B3c").unwrap();
        assert_eq!(color.to_string(), "#1A2B3C");
    }

    #[test]
    fn test_rgb_rejects_garbage() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_rgb_unit_channels() {
        assert_eq!(Rgb::WHITE.to_unit(), (1.0, 1.0, 1.0));
        assert_eq!(Rgb::BLACK.to_unit(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rgb_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb { r: 255, g: 0, b: 16 }).unwrap();
        assert_eq!(json, r##""#FF0010""##);

        let back: Rgb = serde_json::from_str(r##""#ff0010""##).unwrap();
        assert_eq!(back, Rgb { r: 255, g: 0, b: 16 });
        assert!(serde_json::from_str::<Rgb>(r#""red""#).is_err());
    }

    #[test]
    fn test_records_get_unique_ids() {
        let a = ConversionRecord::new("FF", 16, 2, "11111111".to_string());
        let b = ConversionRecord::new("FF", 16, 2, "11111111".to_string());
        assert_ne!(a.id, b.id);
    }
}
