//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`QUICKTOOLS_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use directories::ProjectDirs;
use quicktools_core::qr::{DEFAULT_QR_SIZE, MAX_QR_SIZE, MIN_QR_SIZE};
use quicktools_core::DEFAULT_HISTORY_LIMIT;
use serde::Serialize;
use thiserror::Error;

/// Largest accepted history limit.
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Configuration errors, reported once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not determine a data directory; set QUICKTOOLS_OUTPUT_DIR")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Where watermarked PDFs are written.
    pub output_dir: PathBuf,

    /// Entries kept per tool history.
    pub history_limit: usize,

    /// QR size used when a request carries no style.
    pub default_qr_size: u32,

    /// Log filter directive, if one was configured.
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Creates the configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `QUICKTOOLS_OUTPUT_DIR`: Output folder (default: platform data dir)
    /// - `QUICKTOOLS_HISTORY_LIMIT`: History entries per tool (default: 10)
    /// - `QUICKTOOLS_QR_SIZE`: Default QR size in pixels (default: 300)
    /// - `QUICKTOOLS_LOG`: Log filter (falls back to `RUST_LOG`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_dir = match lookup("QUICKTOOLS_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_output_dir()?,
        };

        let history_limit = match lookup("QUICKTOOLS_HISTORY_LIMIT") {
            Some(raw) => parse_in_range("QUICKTOOLS_HISTORY_LIMIT", &raw, 1, MAX_HISTORY_LIMIT)?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        let default_qr_size = match lookup("QUICKTOOLS_QR_SIZE") {
            Some(raw) => parse_in_range(
                "QUICKTOOLS_QR_SIZE",
                &raw,
                MIN_QR_SIZE as usize,
                MAX_QR_SIZE as usize,
            )? as u32,
            None => DEFAULT_QR_SIZE,
        };

        let log_filter = lookup("QUICKTOOLS_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|v| !v.trim().is_empty());

        Ok(AppConfig {
            output_dir,
            history_limit,
            default_qr_size,
            log_filter,
        })
    }
}

/// Platform output folder.
///
/// - **macOS**: `~/Library/Application Support/app.quicktools.quicktools/output`
/// - **Windows**: `%APPDATA%\quicktools\quicktools\data\output`
/// - **Linux**: `~/.local/share/quicktools/output`
fn default_output_dir() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("app", "quicktools", "quicktools").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("output"))
}

fn parse_in_range(key: &'static str, raw: &str, min: usize, max: usize) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason,
    };

    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid("not a whole number".to_string()))?;

    if !(min..=max).contains(&value) {
        return Err(invalid(format!("must be between {} and {}", min, max)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("QUICKTOOLS_OUTPUT_DIR", "/tmp/qt")])).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/qt"));
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.default_qr_size, 300);
        assert_eq!(config.log_filter, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("QUICKTOOLS_OUTPUT_DIR", "/tmp/qt"),
            ("QUICKTOOLS_HISTORY_LIMIT", "25"),
            ("QUICKTOOLS_QR_SIZE", " 512 "),
            ("RUST_LOG", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.history_limit, 25);
        assert_eq!(config.default_qr_size, 512);
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_quicktools_log_wins_over_rust_log() {
        let config = AppConfig::from_lookup(lookup(&[
            ("QUICKTOOLS_OUTPUT_DIR", "/tmp/qt"),
            ("QUICKTOOLS_LOG", "debug"),
            ("RUST_LOG", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("QUICKTOOLS_HISTORY_LIMIT", "0"),
            ("QUICKTOOLS_HISTORY_LIMIT", "ten"),
            ("QUICKTOOLS_QR_SIZE", "5000"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[("QUICKTOOLS_OUTPUT_DIR", "/tmp/qt"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key),
                "{key}={value}"
            );
        }
    }
}
