//! Driver setup errors.
//!
//! Everything here is a startup-time failure. Once a driver is open,
//! per-tick faults surface as `vapor_common::io::TelemetryError` and
//! are dropped-and-counted by the emitter instead of propagated.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening HAL endpoints.
#[derive(Debug, Error)]
pub enum HalError {
    /// Scenario tape could not be read from disk.
    #[error("scenario read {path}: {source}")]
    ScenarioRead {
        /// Tape path as given on the command line.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Scenario tape is not valid TOML.
    #[error("scenario parse: {0}")]
    ScenarioParse(#[from] toml::de::Error),

    /// Serial endpoint could not be opened.
    #[error("serial open {path}: {source}")]
    SerialOpen {
        /// Configured device path.
        path: String,
        /// Errno from `open(2)`.
        source: nix::Error,
    },

    /// Uplink socket could not be created or connected.
    #[error("uplink setup {addr}: {source}")]
    UplinkSetup {
        /// Configured collector address.
        addr: String,
        /// Underlying socket failure.
        source: std::io::Error,
    },
}
