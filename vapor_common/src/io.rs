//! Capability ports between the control core and its drivers.
//!
//! The control loop is wired against these traits only; hardware and
//! simulation drivers implement them, and tests substitute deterministic
//! fakes. All ports are polled from the single control tick — no port
//! method may block.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{ActuatorCommand, DiscreteOutputs, Measurements};
use crate::telemetry::{Announcement, FeedMessage};

// ─── Operator Input ─────────────────────────────────────────────────

/// Raw operator input levels accumulated since the previous poll.
///
/// Button members are *levels* (true = pressed); the input sampler
/// debounces them into edges on the tick grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputs {
    /// Net rotary movement [detents], sign follows rotation direction.
    pub rotary_delta: i32,
    /// Mode-toggle button level.
    pub mode_button_down: bool,
    /// ESD trigger/reset button level.
    pub esd_button_down: bool,
}

/// Source of operator input.
///
/// `poll` is called exactly once per tick and consumes everything
/// accumulated since the previous call.
pub trait InputSource {
    fn poll(&mut self) -> RawInputs;
}

// ─── Plant ──────────────────────────────────────────────────────────

/// The process being controlled (real or simulated).
///
/// `advance` applies the previous tick's outputs for one integration
/// step; `sample` returns the readings for the current tick. A reading
/// reported as `None` is treated as an emergency by the supervisor.
pub trait ProcessPlant {
    /// Advance the plant by `dt_s` [s] under the held command.
    fn advance(&mut self, command: &ActuatorCommand, discrete: DiscreteOutputs, dt_s: f64);

    /// Sample the current process variables.
    fn sample(&self) -> Measurements;
}

// ─── Actuators ──────────────────────────────────────────────────────

/// Sink for the per-tick actuator image (PWM percentages plus discrete
/// outputs). Must not block; drivers latch and return.
pub trait ActuatorSink {
    fn apply(&mut self, command: &ActuatorCommand, discrete: DiscreteOutputs);
}

// ─── Indicator ──────────────────────────────────────────────────────

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Indicator pattern code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IndicatorPattern {
    /// Continuously on.
    Solid = 0,
    /// 1 Hz alert cadence (5 ticks on / 5 off).
    BlinkSlow = 1,
    /// 2.5 Hz flow cadence (2 ticks on / 2 off).
    BlinkFast = 2,
}

impl IndicatorPattern {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Solid),
            1 => Some(Self::BlinkSlow),
            2 => Some(Self::BlinkFast),
            _ => None,
        }
    }
}

impl Default for IndicatorPattern {
    fn default() -> Self {
        Self::Solid
    }
}

/// Color + pattern code handed to the indicator sink each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorCommand {
    pub color: Rgb,
    pub pattern: IndicatorPattern,
}

impl IndicatorCommand {
    #[inline]
    pub const fn solid(color: Rgb) -> Self {
        Self {
            color,
            pattern: IndicatorPattern::Solid,
        }
    }
}

/// Sink for the status indicator.
pub trait IndicatorSink {
    fn set(&mut self, command: IndicatorCommand);
}

// ─── Telemetry Sinks ────────────────────────────────────────────────

/// Telemetry sink failure. Always non-fatal: the control loop drops the
/// record and continues on the next cadence.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Underlying descriptor/socket error.
    #[error("telemetry sink I/O: {0}")]
    Io(#[from] std::io::Error),
    /// Sink saturated this tick; the record was dropped.
    #[error("telemetry sink busy, record dropped")]
    WouldBlock,
}

/// High-rate serial line sink. Writes are synchronous, non-blocking and
/// best-effort; a stalled consumer must never delay the tick.
pub trait SerialSink {
    fn write_line(&mut self, line: &str) -> Result<(), TelemetryError>;
}

/// Low-rate publish-channel sink (at-most-once delivery).
pub trait FeedPublisher {
    /// One-shot capability announcement, emitted once at startup.
    fn announce(&mut self, announcement: &Announcement) -> Result<(), TelemetryError>;

    /// Publish one feed value.
    fn publish(&mut self, message: &FeedMessage) -> Result<(), TelemetryError>;
}
