//! Per-mode output assembly.
//!
//! Collapses the tick's mode decision, ESD directive, setpoints and
//! measurements into the final `ActuatorCommand` + `DiscreteOutputs`
//! pair. This is the single producer of both outputs; the mode
//! invariants (Recovery forces the valve closed, Preheat forces the
//! heater full) are enforced here.

use vapor_common::config::TrackingConfig;
use vapor_common::prelude::*;

use crate::control::tracking::{track_heater, track_valve};
use crate::flow::pattern_for;
use crate::indicator::blink_phase;
use crate::safety::esd::EsdDirective;

/// Assemble the actuator command and discrete outputs for one tick.
pub fn assemble(
    mode: SystemMode,
    directive: Option<&EsdDirective>,
    setpoints: &Setpoints,
    measurements: &Measurements,
    gains: &TrackingConfig,
    flow: FlowState,
    tick: u64,
) -> (ActuatorCommand, DiscreteOutputs) {
    let pressure = measurements.pressure_kpa.unwrap_or(setpoints.pressure_kpa);
    let temperature = measurements.temperature_c.unwrap_or(setpoints.temperature_c);

    let (command, relief, purge) = match mode {
        SystemMode::Normal(_) => {
            let valve = track_valve(setpoints.pressure_kpa, pressure, gains.pressure_gain_pct_per_kpa);
            let heater =
                track_heater(setpoints.temperature_c, temperature, gains.temperature_gain_pct_per_c);
            (ActuatorCommand::clamped(valve, heater), false, false)
        }
        SystemMode::Recovery => {
            // Valve sealed while the header rebuilds; heat keeps tracking.
            let heater =
                track_heater(setpoints.temperature_c, temperature, gains.temperature_gain_pct_per_c);
            (ActuatorCommand::clamped(0.0, heater), false, false)
        }
        SystemMode::Preheat => {
            // Full heat until the superheater leaves the cold band.
            let valve = track_valve(setpoints.pressure_kpa, pressure, gains.pressure_gain_pct_per_kpa);
            (ActuatorCommand::clamped(valve, 100.0), false, false)
        }
        SystemMode::Esd(_) => match directive {
            Some(d) => (d.command, d.relief, d.purge),
            None => (ActuatorCommand::NEUTRAL, false, false),
        },
    };

    let mut discrete = DiscreteOutputs::empty();
    discrete.set(DiscreteOutputs::RELIEF, relief);
    discrete.set(DiscreteOutputs::PURGE, purge);
    // The sight laser marks any open dump path.
    discrete.set(DiscreteOutputs::LASER, relief || purge);
    discrete.set(
        DiscreteOutputs::FLOW_LED,
        flow.is_active() && blink_phase(pattern_for(flow), tick),
    );

    (command, discrete)
}
