//! Process values, actuator commands and discrete outputs.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::{
    ACTUATOR_MAX_PCT, ACTUATOR_MIN_PCT, ACTUATOR_NEUTRAL_PCT, PRESSURE_SAFE_TARGET_KPA,
    TEMPERATURE_SAFE_TARGET_C,
};

/// Clamp an actuator command to the physical range [%].
#[inline]
pub fn clamp_pct(value: f64) -> f64 {
    value.clamp(ACTUATOR_MIN_PCT, ACTUATOR_MAX_PCT)
}

// ─── Process State ──────────────────────────────────────────────────

/// The simulated plant variables, mutated once per tick by the process
/// model and read-only everywhere else that tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessState {
    /// Steam header pressure [kPa].
    pub pressure_kpa: f64,
    /// Superheater outlet temperature [°C].
    pub temperature_c: f64,
}

impl ProcessState {
    /// Plant state at the reference operating point (300 kPa, 150 °C).
    #[inline]
    pub const fn initial() -> Self {
        Self {
            pressure_kpa: PRESSURE_SAFE_TARGET_KPA,
            temperature_c: TEMPERATURE_SAFE_TARGET_C,
        }
    }
}

impl Default for ProcessState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Sampled readings handed to the safety supervisor.
///
/// `None` means the reading is unavailable this tick; the supervisor
/// classifies it as `Emergency` (fail closed).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    /// Pressure reading [kPa], if available.
    pub pressure_kpa: Option<f64>,
    /// Temperature reading [°C], if available.
    pub temperature_c: Option<f64>,
}

impl From<ProcessState> for Measurements {
    fn from(state: ProcessState) -> Self {
        Self {
            pressure_kpa: Some(state.pressure_kpa),
            temperature_c: Some(state.temperature_c),
        }
    }
}

// ─── Actuator Command ───────────────────────────────────────────────

/// Modulating-valve opening and superheater power, both [%].
///
/// Produced once per tick by the mode controller; applied to the plant
/// on the *next* tick (zero-order hold).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Modulating valve opening [%], 0 = closed.
    pub valve_pct: f64,
    /// Superheater power [%], 50 = thermal equilibrium.
    pub heater_pct: f64,
}

impl ActuatorCommand {
    /// Neutral command: both actuators at 50 % hold the process steady.
    pub const NEUTRAL: Self = Self {
        valve_pct: ACTUATOR_NEUTRAL_PCT,
        heater_pct: ACTUATOR_NEUTRAL_PCT,
    };

    /// Build a command with both members clamped to [0,100] %.
    #[inline]
    pub fn clamped(valve_pct: f64, heater_pct: f64) -> Self {
        Self {
            valve_pct: clamp_pct(valve_pct),
            heater_pct: clamp_pct(heater_pct),
        }
    }

    /// Returns true when both members are inside the physical range.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        (ACTUATOR_MIN_PCT..=ACTUATOR_MAX_PCT).contains(&self.valve_pct)
            && (ACTUATOR_MIN_PCT..=ACTUATOR_MAX_PCT).contains(&self.heater_pct)
    }
}

impl Default for ActuatorCommand {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// ─── Setpoints ──────────────────────────────────────────────────────

/// Operator targets, one per operating mode.
///
/// Mutated only by rotary deltas (silently clamped to the configured
/// range); both persist across mode toggles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoints {
    /// Pressure target [kPa].
    pub pressure_kpa: f64,
    /// Temperature target [°C].
    pub temperature_c: f64,
}

impl Setpoints {
    /// Setpoints at the reference operating point.
    #[inline]
    pub const fn initial() -> Self {
        Self {
            pressure_kpa: PRESSURE_SAFE_TARGET_KPA,
            temperature_c: TEMPERATURE_SAFE_TARGET_C,
        }
    }
}

impl Default for Setpoints {
    fn default() -> Self {
        Self::initial()
    }
}

// ─── Discrete Outputs ───────────────────────────────────────────────

bitflags! {
    /// Digital output image written to the actuator sink each tick.
    ///
    /// `RELIEF`/`PURGE` are the ESD dump valves; `LASER` is the sight
    /// indicator and mirrors `RELIEF | PURGE`; `FLOW_LED` carries the
    /// flow-band pattern resolved to a per-tick level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DiscreteOutputs: u8 {
        /// Pressure relief valve open.
        const RELIEF   = 0b0000_0001;
        /// Purge system open.
        const PURGE    = 0b0000_0010;
        /// Laser sight on (any dump valve open).
        const LASER    = 0b0000_0100;
        /// Flow-band LED level this tick.
        const FLOW_LED = 0b0000_1000;
    }
}

impl Default for DiscreteOutputs {
    fn default() -> Self {
        Self::empty()
    }
}

impl DiscreteOutputs {
    /// Returns true when either dump valve is open.
    #[inline]
    pub const fn any_dump_valve_open(&self) -> bool {
        self.intersects(Self::RELIEF.union(Self::PURGE))
    }
}
