//! Prelude module for common re-exports.
//!
//! Consumers can `use vapor_common::prelude::*;` and get the most
//! important types without listing individual paths.

use std::time::Duration;

// ─── State ──────────────────────────────────────────────────────────
pub use crate::state::{EsdPhase, FlowState, OperatingMode, SafetyLevel, SystemMode};

// ─── Process ────────────────────────────────────────────────────────
pub use crate::process::{
    ActuatorCommand, DiscreteOutputs, Measurements, ProcessState, Setpoints,
};

// ─── Ports ──────────────────────────────────────────────────────────
pub use crate::io::{
    ActuatorSink, FeedPublisher, IndicatorCommand, IndicatorPattern, IndicatorSink, InputSource,
    ProcessPlant, RawInputs, Rgb, SerialSink, TelemetryError,
};

// ─── Telemetry ──────────────────────────────────────────────────────
pub use crate::telemetry::{Announcement, FeedMessage, TelemetrySnapshot};

// ─── Timing ─────────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_PUBLISH_INTERVAL_TICKS, DEFAULT_TICK_PERIOD_MS};

/// Default control tick period as Duration (100 ms).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(DEFAULT_TICK_PERIOD_MS);
