//! # quicktools-core: Pure Tool Logic for Quicktools
//!
//! This crate is the **heart** of Quicktools. Every tool's semantics live
//! here as pure functions and plain state structs with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quicktools Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front end (tool pages)                       │   │
//! │  │   Base ──► Rounding ──► Calculator ──► QR ──► PDF Watermark    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON-lines IPC                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/quicktools commands                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ quicktools-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌──────────┐ ┌────────────┐ ┌─────┐ ┌──────────┐ │   │
//! │  │   │  base  │ │ rounding │ │ calculator │ │ qr  │ │watermark │ │   │
//! │  │   └────────┘ └──────────┘ └────────────┘ └─────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO RENDERING • NO LOGGING • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               quicktools-render (qrcode, image, lopdf)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Number base conversion (2–36)
//! - [`rounding`] - Five rounding policies by places or significant figures
//! - [`calculator`] - Calculator state and its reducer
//! - [`qr`] - QR payload strings and logo plate geometry
//! - [`watermark`] - Watermark page selection and placement
//! - [`history`] - Bounded, newest-first session history
//! - [`types`] - Shared records and colors
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use quicktools_core::base;
//! use quicktools_core::rounding::{round_decimal, RoundingMethod};
//!
//! assert_eq!(base::to_decimal("FF", 16).unwrap(), 255);
//! assert_eq!(base::from_decimal(255, 2).unwrap(), "11111111");
//! assert_eq!(round_decimal(2.5, 0, RoundingMethod::Bankers), 2.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod base;
pub mod calculator;
pub mod error;
pub mod history;
pub mod qr;
pub mod rounding;
pub mod types;
pub mod validation;
pub mod watermark;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use history::BoundedHistory;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of entries each tool keeps in its session history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Smallest supported numeral base.
pub const MIN_BASE: u32 = 2;

/// Largest supported numeral base (`0-9` plus `A-Z`).
pub const MAX_BASE: u32 = 36;
