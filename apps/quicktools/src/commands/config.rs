//! # Configuration Commands

use tracing::debug;

use crate::state::AppConfig;

/// Gets the application configuration.
///
/// ## Returns
/// The output folder, history limit, default QR size and log filter
pub fn get_config(config: &AppConfig) -> AppConfig {
    debug!("get_config command");
    config.clone()
}
