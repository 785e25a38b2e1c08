//! Configuration structures for the vapor control core.
//!
//! All config types use `serde::Deserialize` for TOML loading. Every field
//! carries a `#[serde(default)]` so a partial (or empty) config file yields
//! the firmware defaults. Validation is separate from deserialization: each
//! section has a `validate()` returning a human-readable rejection reason.

use serde::{Deserialize, Serialize};

use crate::consts::{
    BUTTON_DEBOUNCE_MS, DEFAULT_PUBLISH_INTERVAL_TICKS, DEFAULT_TICK_PERIOD_MS,
    PLANT_ACTUATOR_GAIN_DEFAULT, PLANT_DUMP_GAIN_DEFAULT, PRESSURE_SAFE_TARGET_KPA,
    SETPOINT_PRESSURE_MAX_KPA, SETPOINT_PRESSURE_MIN_KPA, SETPOINT_TEMPERATURE_MAX_C,
    SETPOINT_TEMPERATURE_MIN_C, TEMPERATURE_SAFE_TARGET_C, TICK_PERIOD_MS_MAX,
    TICK_PERIOD_MS_MIN, TRACKING_GAIN_PRESSURE_DEFAULT, TRACKING_GAIN_TEMPERATURE_DEFAULT,
};

// ─── Scheduler Section ──────────────────────────────────────────────

/// Tick scheduling and input conditioning parameters (`[control]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Control tick period [ms] (default: 100).
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Feed publish interval [ticks] (default: 50 = 5 s at 100 ms).
    #[serde(default = "default_publish_interval")]
    pub publish_interval_ticks: u64,

    /// Button debounce window [ms] (default: 120).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,

    /// CPU core to pin the tick loop to (`rt` feature only).
    #[serde(default)]
    pub cpu_core: usize,

    /// SCHED_FIFO priority for the tick loop (`rt` feature only, default: 80).
    #[serde(default = "default_rt_priority")]
    pub rt_priority: i32,
}

fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}
fn default_publish_interval() -> u64 {
    DEFAULT_PUBLISH_INTERVAL_TICKS
}
fn default_debounce_ms() -> u32 {
    BUTTON_DEBOUNCE_MS
}
fn default_rt_priority() -> i32 {
    80
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            publish_interval_ticks: DEFAULT_PUBLISH_INTERVAL_TICKS,
            debounce_ms: BUTTON_DEBOUNCE_MS,
            cpu_core: 0,
            rt_priority: 80,
        }
    }
}

impl ControlConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_period_ms < TICK_PERIOD_MS_MIN || self.tick_period_ms > TICK_PERIOD_MS_MAX {
            return Err(format!(
                "tick_period_ms {} out of range [{}, {}]",
                self.tick_period_ms, TICK_PERIOD_MS_MIN, TICK_PERIOD_MS_MAX
            ));
        }
        if self.publish_interval_ticks == 0 {
            return Err("publish_interval_ticks must be >= 1".to_string());
        }
        if self.rt_priority < 1 || self.rt_priority > 99 {
            return Err(format!(
                "rt_priority {} out of range [1, 99]",
                self.rt_priority
            ));
        }
        Ok(())
    }

    /// Debounce window expressed in whole ticks, rounded up, at least 1.
    pub fn debounce_ticks(&self) -> u32 {
        let period = self.tick_period_ms.max(1) as u32;
        self.debounce_ms.div_ceil(period).max(1)
    }
}

// ─── Tracking Section ───────────────────────────────────────────────

/// Proportional tracking gains (`[tracking]`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Valve response per unit of pressure error [%/kPa] (default: 0.5).
    #[serde(default = "default_pressure_gain")]
    pub pressure_gain_pct_per_kpa: f64,

    /// Heater response per unit of temperature error [%/°C] (default: 1.0).
    #[serde(default = "default_temperature_gain")]
    pub temperature_gain_pct_per_c: f64,
}

fn default_pressure_gain() -> f64 {
    TRACKING_GAIN_PRESSURE_DEFAULT
}
fn default_temperature_gain() -> f64 {
    TRACKING_GAIN_TEMPERATURE_DEFAULT
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            pressure_gain_pct_per_kpa: TRACKING_GAIN_PRESSURE_DEFAULT,
            temperature_gain_pct_per_c: TRACKING_GAIN_TEMPERATURE_DEFAULT,
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.pressure_gain_pct_per_kpa.is_finite() || self.pressure_gain_pct_per_kpa <= 0.0 {
            return Err(format!(
                "pressure_gain_pct_per_kpa {} must be finite and > 0",
                self.pressure_gain_pct_per_kpa
            ));
        }
        if !self.temperature_gain_pct_per_c.is_finite() || self.temperature_gain_pct_per_c <= 0.0 {
            return Err(format!(
                "temperature_gain_pct_per_c {} must be finite and > 0",
                self.temperature_gain_pct_per_c
            ));
        }
        Ok(())
    }
}

// ─── Setpoint Section ───────────────────────────────────────────────

/// Operator setpoint limits and startup values (`[setpoints]`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetpointConfig {
    /// Lowest commandable pressure setpoint [kPa] (default: 150).
    #[serde(default = "default_pressure_min")]
    pub pressure_min_kpa: f64,
    /// Highest commandable pressure setpoint [kPa] (default: 450).
    #[serde(default = "default_pressure_max")]
    pub pressure_max_kpa: f64,
    /// Startup pressure setpoint [kPa] (default: 300).
    #[serde(default = "default_pressure_initial")]
    pub pressure_initial_kpa: f64,

    /// Lowest commandable temperature setpoint [°C] (default: 60).
    #[serde(default = "default_temperature_min")]
    pub temperature_min_c: f64,
    /// Highest commandable temperature setpoint [°C] (default: 185).
    #[serde(default = "default_temperature_max")]
    pub temperature_max_c: f64,
    /// Startup temperature setpoint [°C] (default: 150).
    #[serde(default = "default_temperature_initial")]
    pub temperature_initial_c: f64,
}

fn default_pressure_min() -> f64 {
    SETPOINT_PRESSURE_MIN_KPA
}
fn default_pressure_max() -> f64 {
    SETPOINT_PRESSURE_MAX_KPA
}
fn default_pressure_initial() -> f64 {
    PRESSURE_SAFE_TARGET_KPA
}
fn default_temperature_min() -> f64 {
    SETPOINT_TEMPERATURE_MIN_C
}
fn default_temperature_max() -> f64 {
    SETPOINT_TEMPERATURE_MAX_C
}
fn default_temperature_initial() -> f64 {
    TEMPERATURE_SAFE_TARGET_C
}

impl Default for SetpointConfig {
    fn default() -> Self {
        Self {
            pressure_min_kpa: SETPOINT_PRESSURE_MIN_KPA,
            pressure_max_kpa: SETPOINT_PRESSURE_MAX_KPA,
            pressure_initial_kpa: PRESSURE_SAFE_TARGET_KPA,
            temperature_min_c: SETPOINT_TEMPERATURE_MIN_C,
            temperature_max_c: SETPOINT_TEMPERATURE_MAX_C,
            temperature_initial_c: TEMPERATURE_SAFE_TARGET_C,
        }
    }
}

impl SetpointConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, v) in [
            ("pressure_min_kpa", self.pressure_min_kpa),
            ("pressure_max_kpa", self.pressure_max_kpa),
            ("pressure_initial_kpa", self.pressure_initial_kpa),
            ("temperature_min_c", self.temperature_min_c),
            ("temperature_max_c", self.temperature_max_c),
            ("temperature_initial_c", self.temperature_initial_c),
        ] {
            if !v.is_finite() {
                return Err(format!("{name} must be finite, got {v}"));
            }
        }
        if self.pressure_min_kpa >= self.pressure_max_kpa {
            return Err(format!(
                "pressure setpoint range empty: min {} >= max {}",
                self.pressure_min_kpa, self.pressure_max_kpa
            ));
        }
        if self.temperature_min_c >= self.temperature_max_c {
            return Err(format!(
                "temperature setpoint range empty: min {} >= max {}",
                self.temperature_min_c, self.temperature_max_c
            ));
        }
        if self.pressure_initial_kpa < self.pressure_min_kpa
            || self.pressure_initial_kpa > self.pressure_max_kpa
        {
            return Err(format!(
                "pressure_initial_kpa {} outside [{}, {}]",
                self.pressure_initial_kpa, self.pressure_min_kpa, self.pressure_max_kpa
            ));
        }
        if self.temperature_initial_c < self.temperature_min_c
            || self.temperature_initial_c > self.temperature_max_c
        {
            return Err(format!(
                "temperature_initial_c {} outside [{}, {}]",
                self.temperature_initial_c, self.temperature_min_c, self.temperature_max_c
            ));
        }
        Ok(())
    }
}

// ─── Plant Section ──────────────────────────────────────────────────

/// Simulated process model parameters (`[plant]`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Vessel pressure at startup [kPa] (default: 300).
    #[serde(default = "default_plant_pressure")]
    pub initial_pressure_kpa: f64,
    /// Superheater temperature at startup [°C] (default: 150).
    #[serde(default = "default_plant_temperature")]
    pub initial_temperature_c: f64,
    /// Process response per unit of actuator deviation [unit/% per s] (default: 0.1).
    #[serde(default = "default_actuator_gain")]
    pub actuator_gain: f64,
    /// Dump-path response during relief/purge [1/s] (default: 0.2).
    #[serde(default = "default_dump_gain")]
    pub dump_gain: f64,
}

fn default_plant_pressure() -> f64 {
    PRESSURE_SAFE_TARGET_KPA
}
fn default_plant_temperature() -> f64 {
    TEMPERATURE_SAFE_TARGET_C
}
fn default_actuator_gain() -> f64 {
    PLANT_ACTUATOR_GAIN_DEFAULT
}
fn default_dump_gain() -> f64 {
    PLANT_DUMP_GAIN_DEFAULT
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            initial_pressure_kpa: PRESSURE_SAFE_TARGET_KPA,
            initial_temperature_c: TEMPERATURE_SAFE_TARGET_C,
            actuator_gain: PLANT_ACTUATOR_GAIN_DEFAULT,
            dump_gain: PLANT_DUMP_GAIN_DEFAULT,
        }
    }
}

impl PlantConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.initial_pressure_kpa.is_finite() || self.initial_pressure_kpa < 0.0 {
            return Err(format!(
                "initial_pressure_kpa {} must be finite and >= 0",
                self.initial_pressure_kpa
            ));
        }
        if !self.initial_temperature_c.is_finite() || self.initial_temperature_c < 0.0 {
            return Err(format!(
                "initial_temperature_c {} must be finite and >= 0",
                self.initial_temperature_c
            ));
        }
        if !self.actuator_gain.is_finite() || self.actuator_gain <= 0.0 {
            return Err(format!(
                "actuator_gain {} must be finite and > 0",
                self.actuator_gain
            ));
        }
        if !self.dump_gain.is_finite() || self.dump_gain <= 0.0 {
            return Err(format!(
                "dump_gain {} must be finite and > 0",
                self.dump_gain
            ));
        }
        Ok(())
    }
}

// ─── Telemetry Section ──────────────────────────────────────────────

/// Telemetry sink endpoints (`[telemetry]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Serial device path, or `"-"` for stdout (default: `"-"`).
    #[serde(default = "default_serial_path")]
    pub serial_path: String,

    /// UDP endpoint for the remote feed (`host:port`, default: 127.0.0.1:9870).
    #[serde(default = "default_uplink_addr")]
    pub uplink_addr: String,

    /// Device identifier used in the capability announcement.
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

fn default_serial_path() -> String {
    "-".to_string()
}
fn default_uplink_addr() -> String {
    "127.0.0.1:9870".to_string()
}
fn default_device_name() -> String {
    "vapor-core".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            serial_path: default_serial_path(),
            uplink_addr: default_uplink_addr(),
            device_name: default_device_name(),
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.serial_path.is_empty() {
            return Err("serial_path cannot be empty".to_string());
        }
        if self.uplink_addr.is_empty() {
            return Err("uplink_addr cannot be empty".to_string());
        }
        if self.device_name.is_empty() {
            return Err("device_name cannot be empty".to_string());
        }
        Ok(())
    }
}

// ─── Top-Level Bundle ───────────────────────────────────────────────

/// Complete control core configuration, loaded from a single TOML file.
///
/// Every section defaults, so an empty file is a valid config describing
/// the stock simulated rig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaporConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub setpoints: SetpointConfig,
    #[serde(default)]
    pub plant: PlantConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl VaporConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.control.validate()?;
        self.tracking.validate()?;
        self.setpoints.validate()?;
        self.plant.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}
