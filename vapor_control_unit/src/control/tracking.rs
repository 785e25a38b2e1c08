//! Proportional setpoint tracking.
//!
//! Each actuator tracks its own process variable around the neutral
//! point: positive error (target above current value) pushes the valve
//! below neutral to build pressure and the heater above neutral to add
//! heat. Output is always clamped to [0,100] %, so the response is
//! monotonic in the error and bounded regardless of gain.

use vapor_common::consts::ACTUATOR_NEUTRAL_PCT;
use vapor_common::process::clamp_pct;

/// Valve command [%] tracking a pressure setpoint [kPa].
///
/// `valve = 50 − gain·(setpoint − measured)`: the valve opens past
/// neutral to vent when pressure is above target and closes below
/// neutral to build when it is under. Non-finite inputs collapse to
/// zero error (neutral).
#[inline]
pub fn track_valve(setpoint_kpa: f64, pressure_kpa: f64, gain_pct_per_kpa: f64) -> f64 {
    let error = setpoint_kpa - pressure_kpa;
    if !error.is_finite() {
        return ACTUATOR_NEUTRAL_PCT;
    }
    clamp_pct(ACTUATOR_NEUTRAL_PCT - gain_pct_per_kpa * error)
}

/// Heater command [%] tracking a temperature setpoint [°C].
///
/// `heater = 50 + gain·(setpoint − measured)`. Non-finite inputs
/// collapse to zero error (neutral).
#[inline]
pub fn track_heater(setpoint_c: f64, temperature_c: f64, gain_pct_per_c: f64) -> f64 {
    let error = setpoint_c - temperature_c;
    if !error.is_finite() {
        return ACTUATOR_NEUTRAL_PCT;
    }
    clamp_pct(ACTUATOR_NEUTRAL_PCT + gain_pct_per_c * error)
}
