//! # Request Tracking
//!
//! Decides which of several overlapping render requests may publish its
//! result.
//!
//! ## Last Request Wins
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate_qr #1 ──► begin() = 1 ──── rendering ──────────────┐          │
//! │  generate_qr #2 ──► begin() = 2 ── rendering ──┐              │          │
//! │                                                ▼              ▼          │
//! │                                   is_current(2)? yes   is_current(1)? no │
//! │                                   publish              SUPERSEDED        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The request that started last owns the tool's output, whatever order the
//! renders finish in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::outputs::OutputSlot;

/// Generation of one request, issued by [`RequestTracker::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Per-tool generation counter.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generation: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, invalidating every earlier token.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// True while no newer request has started.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::Acquire) == token.0
    }
}

/// State of a tool that renders in the background: its request tracker
/// and the slot holding its current output.
#[derive(Debug, Clone, Default)]
pub struct RenderJobState {
    pub tracker: RequestTracker,
    pub slot: OutputSlot,
    /// Held while writing an output file and publishing it, so a superseded
    /// request can remove its own file without racing a newer write.
    pub files: Arc<tokio::sync::Mutex<()>>,
}

impl RenderJobState {
    pub fn new() -> Self {
        Self::default()
    }
}
