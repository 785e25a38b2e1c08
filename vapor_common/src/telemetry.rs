//! Telemetry snapshot and publish-channel message types.
//!
//! The snapshot is the immutable per-tick aggregate consumed by the
//! telemetry emitter; the feed/announcement messages are the JSON wire
//! types shared with the uplink liaison.

use heapless::{String as HString, Vec as HVec};
use serde::{Deserialize, Serialize};

use crate::state::{EsdPhase, FlowState, OperatingMode, SafetyLevel, SystemMode};

/// Capacity of one feed name on the wire.
pub const FEED_NAME_CAP: usize = 24;

/// Maximum feeds one announcement can list.
pub const MAX_FEEDS: usize = 8;

/// Pressure feed name on the publish channel.
pub const FEED_PRESSURE: &str = "pressure";

/// Temperature feed name on the publish channel.
pub const FEED_TEMPERATURE: &str = "temperature";

// ─── Snapshot ───────────────────────────────────────────────────────

/// Immutable aggregate of all control-core state, captured atomically
/// once per tick for the telemetry emitter. Never mutated after capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Tick index since startup.
    pub tick: u64,
    /// Pressure [kPa].
    pub pressure_kpa: f64,
    /// Temperature [°C].
    pub temperature_c: f64,
    /// Modulating valve opening [%].
    pub valve_pct: f64,
    /// Superheater power [%].
    pub heater_pct: f64,
    /// Flow band this tick.
    pub flow: FlowState,
    /// Operator mode (the remembered one during special modes).
    pub operating_mode: OperatingMode,
    /// Top-level system mode.
    pub system_mode: SystemMode,
    /// ESD phase (mirrors `system_mode` for flat consumers).
    pub esd_phase: EsdPhase,
    /// Pressure safety classification.
    pub pressure_level: SafetyLevel,
    /// Temperature safety classification.
    pub temperature_level: SafetyLevel,
    /// Relief valve open this tick.
    pub relief_open: bool,
    /// Purge system open this tick.
    pub purge_open: bool,
}

impl TelemetrySnapshot {
    /// Returns true while the ESD supersedes operator control.
    #[inline]
    pub const fn esd_engaged(&self) -> bool {
        self.esd_phase.is_engaged()
    }
}

// ─── Publish Channel Messages ───────────────────────────────────────

/// One published feed value: a topic name and a single-element numeric
/// array payload. Delivery is at-most-once; no retention, no acks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    /// Feed (topic) name.
    pub feed: HString<FEED_NAME_CAP>,
    /// Single-element payload array.
    pub value: [f64; 1],
}

impl FeedMessage {
    /// Build a feed message. Names longer than [`FEED_NAME_CAP`] are
    /// truncated; the shipped feed names are well under the cap.
    pub fn new(feed: &str, value: f64) -> Self {
        let mut name = HString::new();
        for c in feed.chars() {
            if name.push(c).is_err() {
                break;
            }
        }
        Self {
            feed: name,
            value: [value],
        }
    }
}

/// One-shot capability announcement emitted at startup: device name,
/// the feeds it will publish, and the firmware version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Device name.
    pub device: HString<32>,
    /// Firmware version string.
    pub version: HString<16>,
    /// Feeds this device publishes.
    pub feeds: HVec<HString<FEED_NAME_CAP>, MAX_FEEDS>,
}

impl Announcement {
    /// Build the standard announcement for this device.
    pub fn new(device: &str, version: &str) -> Self {
        let mut out = Self {
            device: HString::new(),
            version: HString::new(),
            feeds: HVec::new(),
        };
        for c in device.chars() {
            if out.device.push(c).is_err() {
                break;
            }
        }
        for c in version.chars() {
            if out.version.push(c).is_err() {
                break;
            }
        }
        for feed in [FEED_PRESSURE, FEED_TEMPERATURE] {
            let msg = FeedMessage::new(feed, 0.0);
            // Capacity is MAX_FEEDS; two pushes cannot fail.
            let _ = out.feeds.push(msg.feed);
        }
        out
    }
}
