//! # Quicktools Library
//!
//! Core library for the Quicktools application shell.
//! This is the main entry point that configures and runs the IPC loop.
//!
//! ## Module Organization
//! ```text
//! quicktools/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── ipc.rs          ◄─── JSON-lines reader, request tasks, writer
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState and re-exports
//! │   ├── config.rs   ◄─── AppConfig from QUICKTOOLS_* variables
//! │   ├── history.rs  ◄─── Base / rounding session history
//! │   ├── calculator.rs ◄─ Calculator reducer state
//! │   ├── requests.rs ◄─── Generation counters for render jobs
//! │   └── outputs.rs  ◄─── Output registry and RAII handles
//! ├── commands/       ◄─── One module per tool
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management (Multiple State Types)
//! Instead of one mutable god object, each tool owns a focused state type
//! and each command borrows only the state it needs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Management                                     │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  BaseState /     │ │    CalcState     │ │   RenderJobState     │   │
//! │  │  RoundingState   │ │                  │ │   (qr, watermark)    │   │
//! │  │                  │ │  • display       │ │                      │   │
//! │  │  • history (10)  │ │  • memory        │ │  • request tracker   │   │
//! │  │                  │ │  • history (10)  │ │  • current output    │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod ipc;
pub mod state;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{AppConfig, AppState};

/// Default log filter when neither `QUICKTOOLS_LOG` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "info,quicktools=debug";

/// Runs the application until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • QUICKTOOLS_* environment variables over defaults                  │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,quicktools=debug                                    │
/// │                                                                         │
/// │  3. Prepare Output Folder ────────────────────────────────────────────► │
/// │     • Linux: ~/.local/share/quicktools/output                           │
/// │                                                                         │
/// │  4. Initialize State Objects ─────────────────────────────────────────► │
/// │     • Histories, calculator, render jobs, output registry               │
/// │                                                                         │
/// │  5. Serve stdin ──► stdout ───────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_filter.as_deref());

    info!("Starting Quicktools");

    tokio::fs::create_dir_all(&config.output_dir).await?;
    info!(output_dir = ?config.output_dir, "Output folder ready");

    let state = AppState::new(config);
    info!("State initialized");

    ipc::serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), state).await?;

    info!("Quicktools stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `QUICKTOOLS_LOG=debug` - Show debug messages
/// - `QUICKTOOLS_LOG=quicktools_render=trace` - Trace the render crate only
/// - Default: INFO level, DEBUG for the app
///
/// Logs go to stderr; stdout carries IPC responses only.
fn init_tracing(filter: Option<&str>) {
    let filter = filter
        .map(EnvFilter::try_new)
        .and_then(Result::ok)
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
