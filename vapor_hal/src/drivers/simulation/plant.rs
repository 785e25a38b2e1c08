//! First-order plant model of the steam rig.
//!
//! One integration step per tick under the held outputs:
//!
//! * Valve below neutral starves the vent and builds pressure; above
//!   neutral it vents. The relief path overrides venting and bleeds the
//!   header toward the 300 kPa reference instead.
//! * Heater above neutral adds heat; below neutral the rig sheds it.
//!   The purge path overrides heating and pulls the superheater toward
//!   150 °C.
//! * Neither variable goes below zero.
//!
//! Proportional terms use the actuator gain; the relief/purge bleed
//! uses the (faster) dump gain. With defaults, a full-scale actuator
//! moves its variable 0.5 units per 100 ms tick, and a dump closes 2 %
//! of the remaining error per tick.

use tracing::trace;

use vapor_common::config::PlantConfig;
use vapor_common::consts::{
    ACTUATOR_NEUTRAL_PCT, PRESSURE_SAFE_TARGET_KPA, TEMPERATURE_SAFE_TARGET_C,
};
use vapor_common::io::ProcessPlant;
use vapor_common::process::{ActuatorCommand, DiscreteOutputs, Measurements, ProcessState};

/// Deterministic first-order process model.
#[derive(Debug, Clone)]
pub struct SimulatedPlant {
    state: ProcessState,
    actuator_gain: f64,
    dump_gain: f64,
}

impl SimulatedPlant {
    /// Build the plant at the configured initial operating point.
    pub fn new(config: &PlantConfig) -> Self {
        Self {
            state: ProcessState {
                pressure_kpa: config.initial_pressure_kpa,
                temperature_c: config.initial_temperature_c,
            },
            actuator_gain: config.actuator_gain,
            dump_gain: config.dump_gain,
        }
    }

    /// Ground-truth plant state (not a measurement).
    pub const fn state(&self) -> ProcessState {
        self.state
    }
}

impl ProcessPlant for SimulatedPlant {
    fn advance(&mut self, command: &ActuatorCommand, discrete: DiscreteOutputs, dt_s: f64) {
        let relief = discrete.contains(DiscreteOutputs::RELIEF);
        let purge = discrete.contains(DiscreteOutputs::PURGE);

        // Pressure: valve relative to neutral, except the relief path
        // replaces venting while it is open.
        if command.valve_pct < ACTUATOR_NEUTRAL_PCT {
            self.state.pressure_kpa +=
                (ACTUATOR_NEUTRAL_PCT - command.valve_pct) * dt_s * self.actuator_gain;
        } else if command.valve_pct > ACTUATOR_NEUTRAL_PCT && !relief {
            self.state.pressure_kpa -=
                (command.valve_pct - ACTUATOR_NEUTRAL_PCT) * dt_s * self.actuator_gain;
        }
        if relief {
            self.state.pressure_kpa -=
                (self.state.pressure_kpa - PRESSURE_SAFE_TARGET_KPA) * dt_s * self.dump_gain;
        }

        // Temperature: heater relative to neutral, except the purge
        // path replaces heating while it is open.
        if command.heater_pct > ACTUATOR_NEUTRAL_PCT && !purge {
            self.state.temperature_c +=
                (command.heater_pct - ACTUATOR_NEUTRAL_PCT) * dt_s * self.actuator_gain;
        } else if command.heater_pct < ACTUATOR_NEUTRAL_PCT {
            self.state.temperature_c -=
                (ACTUATOR_NEUTRAL_PCT - command.heater_pct) * dt_s * self.actuator_gain;
        }
        if purge {
            self.state.temperature_c -=
                (self.state.temperature_c - TEMPERATURE_SAFE_TARGET_C) * dt_s * self.dump_gain;
        }

        self.state.pressure_kpa = self.state.pressure_kpa.max(0.0);
        self.state.temperature_c = self.state.temperature_c.max(0.0);

        trace!(
            pressure_kpa = self.state.pressure_kpa,
            temperature_c = self.state.temperature_c,
            valve = command.valve_pct,
            heater = command.heater_pct,
            relief,
            purge,
            "plant step"
        );
    }

    fn sample(&self) -> Measurements {
        Measurements::from(self.state)
    }
}
