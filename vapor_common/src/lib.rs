//! Vapor Common Library
//!
//! Shared types for the vapor-core workspace: process and actuator data,
//! state enums, fixed plant thresholds, capability ports, and telemetry
//! message formats. This crate performs no I/O; every type here is consumed
//! by the control unit, the HAL drivers, or the uplink liaison.
//!
//! # Module Structure
//!
//! - [`state`] - State enums: operating mode, system mode, ESD phase,
//!   safety level, flow band
//! - [`process`] - Process values, actuator commands, discrete outputs
//! - [`consts`] - Fixed thresholds, targets, tolerances
//! - [`config`] - TOML configuration sections with defaults and validation
//! - [`io`] - Capability ports (traits) between the control core and drivers
//! - [`telemetry`] - Snapshot and publish-channel message types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use vapor_common::prelude::*;
//!
//! let mode = SystemMode::default();
//! assert!(mode.is_normal());
//! ```

pub mod config;
pub mod consts;
pub mod io;
pub mod prelude;
pub mod process;
pub mod state;
pub mod telemetry;
