//! Fixed plant thresholds, targets and timing constants.
//!
//! All limits come from the VaporSur steam-distribution operating
//! envelope. Thresholds are intentionally asymmetric (enter/exit pairs)
//! to provide hysteresis around the special safety modes.

// ─── Reference Operating Point ──────────────────────────────────────

/// Reference pressure [kPa]: initial condition and ESD recovery target.
pub const PRESSURE_SAFE_TARGET_KPA: f64 = 300.0;

/// Reference temperature [°C]: initial condition and ESD recovery target.
pub const TEMPERATURE_SAFE_TARGET_C: f64 = 150.0;

// ─── Pressure Thresholds ────────────────────────────────────────────

/// High-pressure warning threshold [kPa].
pub const PRESSURE_WARN_HIGH_KPA: f64 = 380.0;

/// High-pressure emergency threshold [kPa] — automatic ESD trigger.
pub const PRESSURE_EMERGENCY_KPA: f64 = 460.0;

/// Low-pressure warning threshold [kPa].
pub const PRESSURE_WARN_LOW_KPA: f64 = 250.0;

/// Recovery mode entry threshold [kPa].
pub const PRESSURE_RECOVERY_ENTER_KPA: f64 = 220.0;

/// Recovery mode exit threshold [kPa]. Must exceed the entry threshold
/// so that Recovery cannot chatter at the boundary.
pub const PRESSURE_RECOVERY_EXIT_KPA: f64 = 240.0;

// ─── Temperature Thresholds ─────────────────────────────────────────

/// High-temperature warning threshold [°C].
pub const TEMPERATURE_WARN_HIGH_C: f64 = 170.0;

/// High-temperature emergency threshold [°C] — automatic ESD trigger.
pub const TEMPERATURE_EMERGENCY_C: f64 = 190.0;

/// Low-temperature warning threshold [°C].
pub const TEMPERATURE_WARN_LOW_C: f64 = 120.0;

/// Preheat mode entry threshold [°C].
pub const TEMPERATURE_PREHEAT_ENTER_C: f64 = 110.0;

/// Preheat mode exit threshold [°C].
pub const TEMPERATURE_PREHEAT_EXIT_C: f64 = 130.0;

// ─── ESD Recovery Band ──────────────────────────────────────────────

/// ESD recovery tolerance around the pressure target [kPa].
pub const ESD_PRESSURE_TOLERANCE_KPA: f64 = 5.0;

/// ESD recovery tolerance around the temperature target [°C].
pub const ESD_TEMPERATURE_TOLERANCE_C: f64 = 3.0;

// ─── Actuator Range ─────────────────────────────────────────────────

/// Minimum actuator command [%].
pub const ACTUATOR_MIN_PCT: f64 = 0.0;

/// Maximum actuator command [%].
pub const ACTUATOR_MAX_PCT: f64 = 100.0;

/// Neutral actuator command [%] — holds the process variable steady.
pub const ACTUATOR_NEUTRAL_PCT: f64 = 50.0;

// ─── Operator Input ─────────────────────────────────────────────────

/// Pressure setpoint change per rotary detent [kPa].
pub const ROTARY_PRESSURE_KPA_PER_DETENT: f64 = 2.0;

/// Temperature setpoint change per rotary detent [°C].
pub const ROTARY_TEMPERATURE_C_PER_DETENT: f64 = 1.0;

/// Button debounce interval [ms] — a press counts only after the level
/// has been stable-low for this long.
pub const BUTTON_DEBOUNCE_MS: u32 = 120;

// ─── Setpoint Envelope ──────────────────────────────────────────────

/// Lowest commandable pressure setpoint [kPa].
pub const SETPOINT_PRESSURE_MIN_KPA: f64 = 150.0;

/// Highest commandable pressure setpoint [kPa].
pub const SETPOINT_PRESSURE_MAX_KPA: f64 = 450.0;

/// Lowest commandable temperature setpoint [°C].
pub const SETPOINT_TEMPERATURE_MIN_C: f64 = 60.0;

/// Highest commandable temperature setpoint [°C].
pub const SETPOINT_TEMPERATURE_MAX_C: f64 = 185.0;

// ─── Tracking Gains ─────────────────────────────────────────────────

/// Default valve response per unit of pressure error [%/kPa].
pub const TRACKING_GAIN_PRESSURE_DEFAULT: f64 = 0.5;

/// Default heater response per unit of temperature error [%/°C].
pub const TRACKING_GAIN_TEMPERATURE_DEFAULT: f64 = 1.0;

// ─── Plant Model ────────────────────────────────────────────────────

/// Default process response per unit of actuator deviation [unit/% per s].
pub const PLANT_ACTUATOR_GAIN_DEFAULT: f64 = 0.1;

/// Default dump-path response during relief/purge [1/s].
pub const PLANT_DUMP_GAIN_DEFAULT: f64 = 0.2;

// ─── Timing & Telemetry ─────────────────────────────────────────────

/// Control tick period [ms].
pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;

/// Smallest accepted tick period [ms].
pub const TICK_PERIOD_MS_MIN: u64 = 10;

/// Largest accepted tick period [ms].
pub const TICK_PERIOD_MS_MAX: u64 = 1_000;

/// Publish-channel cadence: one publication every N control ticks.
pub const DEFAULT_PUBLISH_INTERVAL_TICKS: u64 = 50;

/// Number of fields in one serial telemetry record. Downstream console
/// parsers key on this; changing the record shape breaks them.
pub const SERIAL_FIELD_COUNT: usize = 10;
