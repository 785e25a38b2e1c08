//! TOML configuration loader with validation.
//!
//! Loads a single `VaporConfig` TOML file (all sections optional, defaults
//! describe the stock simulated rig) and runs every section's validation
//! before the tick loop is allowed to start.

use std::path::Path;

use vapor_common::config::VaporConfig;

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    IoError(String),
    /// TOML parse error.
    ParseError(String),
    /// Parameter validation error.
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "config I/O error: {e}"),
            Self::ParseError(e) => write!(f, "config parse error: {e}"),
            Self::ValidationError(e) => write!(f, "config validation: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the control core configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<VaporConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&raw)
}

/// Load config from a TOML string (test seam, also used for `--config -`).
pub fn load_config_from_str(raw: &str) -> Result<VaporConfig, ConfigError> {
    let config: VaporConfig =
        toml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate().map_err(ConfigError::ValidationError)?;
    Ok(config)
}
