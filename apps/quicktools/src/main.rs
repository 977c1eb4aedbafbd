//! # Quicktools Entry Point
//!
//! Starts the JSON-lines IPC shell.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Quicktools                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Web front end                               │  │
//! │  │  • Base Converter       • Rounding Calculator                    │  │
//! │  │  • Basic Calculator     • QR Generator     • PDF Watermark       │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 │ {"id":1,"command":"...","args":{..}}  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Starts the runtime                               │  │
//! │  │  lib.rs ─────► Logging, config, state, IPC loop                 │  │
//! │  │  commands/ ──► convert_base, round_number, generate_qr, ...     │  │
//! │  │  state/ ─────► histories, calculator, render jobs, outputs      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The actual setup is in lib.rs for better testability
    quicktools::run().await
}
