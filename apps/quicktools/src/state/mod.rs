//! # Application State
//!
//! One focused state type per tool instead of a single god object.
//!
//! ## State Types
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application State                                │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │  BaseState   │  │RoundingState │  │  CalcState   │  │  AppConfig  │ │
//! │  │              │  │              │  │              │  │             │ │
//! │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │  output_dir │ │
//! │  │   History    │  │   History    │  │   Calculator │  │  history    │ │
//! │  │  >>          │  │  >>          │  │  >>          │  │  qr size    │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └─────────────┘ │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────────┐ │
//! │  │ RenderJobState (qr, pdf)     │  │ OutputRegistry                   │ │
//! │  │  RequestTracker + OutputSlot │  │  uuid ──► bytes, owned by handles│ │
//! │  └──────────────────────────────┘  └──────────────────────────────────┘ │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Histories / CalcState: Arc<Mutex<T>> for exclusive access           │
//! │  • RequestTracker: atomic generation counter                           │
//! │  • AppConfig: Read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod calculator;
mod config;
mod history;
mod outputs;
mod requests;

use std::sync::Arc;

pub use calculator::CalcState;
pub use config::{AppConfig, ConfigError};
pub use history::{BaseState, HistoryState, RoundingState};
pub use outputs::{OutputHandle, OutputRegistry, OutputSlot, StoredOutput};
pub use requests::{RenderJobState, RequestToken, RequestTracker};

/// Every state object, cloned into each request task.
///
/// Commands take only the pieces they need.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub base: BaseState,
    pub rounding: RoundingState,
    pub calculator: CalcState,
    pub qr: RenderJobState,
    pub watermark: RenderJobState,
    pub outputs: OutputRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            base: BaseState::new(config.history_limit),
            rounding: RoundingState::new(config.history_limit),
            calculator: CalcState::new(config.history_limit),
            qr: RenderJobState::new(),
            watermark: RenderJobState::new(),
            outputs: OutputRegistry::new(),
            config: Arc::new(config),
        }
    }
}
