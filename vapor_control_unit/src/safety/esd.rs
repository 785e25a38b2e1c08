//! Emergency shutdown sequencer.
//!
//! Four-phase sub-state-machine: `Inactive → Active → Recovering →
//! ReadyForReset → Inactive`. Engagement is either a debounced ESD press
//! or automatic, one tick after any variable classifies `Emergency`.
//! While engaged the sequencer owns the actuators through a per-tick
//! dump directive that drives both variables toward the safe targets
//! (300 kPa / 150 °C) and holds the phase at `ReadyForReset` until an
//! explicit reset press. ESD presses observed while `Active` or
//! `Recovering` are consumed with no effect.

use tracing::{debug, info, warn};

use vapor_common::consts::{
    ACTUATOR_NEUTRAL_PCT, ESD_PRESSURE_TOLERANCE_KPA, ESD_TEMPERATURE_TOLERANCE_C,
    PRESSURE_SAFE_TARGET_KPA, TEMPERATURE_SAFE_TARGET_C,
};
use vapor_common::prelude::*;

use crate::state::safety::SafetyAssessment;

// ─── Events & Transition Result ─────────────────────────────────────

/// Events the sequencer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsdEvent {
    /// Debounced ESD press while disengaged.
    TriggerEdge,
    /// A variable classified `Emergency` on the previous tick.
    AutoEmergency,
    /// Dump directive took over the actuators.
    DumpEngaged,
    /// Both variables inside the recovery band.
    TargetsReached,
    /// Debounced ESD press while `ReadyForReset`.
    ResetEdge,
}

/// Result of an attempted phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsdTransition {
    /// Transition accepted; new phase.
    Ok(EsdPhase),
    /// Transition rejected with a reason; phase unchanged.
    Rejected(&'static str),
}

// ─── Dump Directive ─────────────────────────────────────────────────

/// Actuator override computed while the sequencer is engaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EsdDirective {
    pub command: ActuatorCommand,
    pub relief: bool,
    pub purge: bool,
}

impl EsdDirective {
    /// Neutral hold: both actuators at 50 %, dump valves closed.
    pub const HOLD: Self = Self {
        command: ActuatorCommand::NEUTRAL,
        relief: false,
        purge: false,
    };
}

// ─── Sequencer ──────────────────────────────────────────────────────

/// Owns the ESD phase and the previous-tick emergency latch.
#[derive(Debug)]
pub struct EsdSequencer {
    phase: EsdPhase,
    emergency_latch: bool,
}

impl EsdSequencer {
    pub const fn new() -> Self {
        Self {
            phase: EsdPhase::Inactive,
            emergency_latch: false,
        }
    }

    pub const fn phase(&self) -> EsdPhase {
        self.phase
    }

    /// Attempt one transition. Pure: no logging, no side effects beyond
    /// the phase itself.
    pub fn handle_event(&mut self, event: EsdEvent) -> EsdTransition {
        use EsdEvent::*;
        use EsdPhase::*;

        let next = match (self.phase, event) {
            (Inactive, TriggerEdge) => Active,
            (Inactive, AutoEmergency) => Active,
            (Active, DumpEngaged) => Recovering,
            (Recovering, TargetsReached) => ReadyForReset,
            (ReadyForReset, ResetEdge) => Inactive,

            (Active | Recovering, TriggerEdge) => {
                return EsdTransition::Rejected("shutdown already engaged");
            }
            (ReadyForReset, TriggerEdge) => {
                return EsdTransition::Rejected("awaiting reset press");
            }
            (_, AutoEmergency) => {
                return EsdTransition::Rejected("already engaged");
            }
            (_, _) => return EsdTransition::Rejected("event not applicable in this phase"),
        };

        self.phase = next;
        EsdTransition::Ok(next)
    }

    /// Advance the sequencer by one tick.
    ///
    /// `esd_edge` is the debounced press for this tick; its meaning
    /// (trigger vs reset) depends on the current phase. Automatic
    /// engagement uses the emergency classification latched on the
    /// *previous* tick, so a variable reaching `Emergency` at tick `n`
    /// engages the sequencer at tick `n + 1`.
    pub fn tick(
        &mut self,
        measurements: &Measurements,
        assessment: &SafetyAssessment,
        esd_edge: bool,
    ) -> EsdPhase {
        let auto_trigger = self.emergency_latch;
        self.emergency_latch = assessment.any_emergency();

        match self.phase {
            EsdPhase::Inactive => {
                if esd_edge {
                    if let EsdTransition::Ok(next) = self.handle_event(EsdEvent::TriggerEdge) {
                        warn!("ESD engaged by operator press");
                        return next;
                    }
                } else if auto_trigger {
                    if let EsdTransition::Ok(next) = self.handle_event(EsdEvent::AutoEmergency) {
                        warn!("ESD engaged automatically (emergency classification)");
                        return next;
                    }
                }
            }
            EsdPhase::Active => {
                if esd_edge {
                    debug!("ESD press ignored: shutdown already engaged");
                }
                if let EsdTransition::Ok(next) = self.handle_event(EsdEvent::DumpEngaged) {
                    info!("ESD dump engaged, driving toward safe targets");
                    return next;
                }
            }
            EsdPhase::Recovering => {
                if esd_edge {
                    debug!("ESD press ignored: recovery in progress");
                }
                if in_band(measurements) {
                    if let EsdTransition::Ok(next) = self.handle_event(EsdEvent::TargetsReached) {
                        info!("ESD recovery complete, ready for reset");
                        return next;
                    }
                }
            }
            EsdPhase::ReadyForReset => {
                if esd_edge {
                    if let EsdTransition::Ok(next) = self.handle_event(EsdEvent::ResetEdge) {
                        info!("ESD reset by operator press");
                        return next;
                    }
                }
            }
        }
        self.phase
    }

    /// Actuator override for this tick; `None` while disengaged.
    ///
    /// The directive follows the dump law: vent (relief open, valve
    /// neutral) above the pressure band, rebuild (valve closed) below
    /// it, hold neutral inside; purge / full heat symmetric for
    /// temperature. Unavailable readings vent (fail closed).
    pub fn directive(&self, measurements: &Measurements) -> Option<EsdDirective> {
        match self.phase {
            EsdPhase::Inactive => None,
            EsdPhase::ReadyForReset => Some(EsdDirective::HOLD),
            EsdPhase::Active | EsdPhase::Recovering => {
                let (valve, relief) = match measurements.pressure_kpa {
                    Some(p) if p - PRESSURE_SAFE_TARGET_KPA > ESD_PRESSURE_TOLERANCE_KPA => {
                        (ACTUATOR_NEUTRAL_PCT, true)
                    }
                    Some(p) if p - PRESSURE_SAFE_TARGET_KPA < -ESD_PRESSURE_TOLERANCE_KPA => {
                        (0.0, false)
                    }
                    Some(_) => (ACTUATOR_NEUTRAL_PCT, false),
                    None => (ACTUATOR_NEUTRAL_PCT, true),
                };
                let (heater, purge) = match measurements.temperature_c {
                    Some(t) if t - TEMPERATURE_SAFE_TARGET_C > ESD_TEMPERATURE_TOLERANCE_C => {
                        (ACTUATOR_NEUTRAL_PCT, true)
                    }
                    Some(t) if t - TEMPERATURE_SAFE_TARGET_C < -ESD_TEMPERATURE_TOLERANCE_C => {
                        (100.0, false)
                    }
                    Some(_) => (ACTUATOR_NEUTRAL_PCT, false),
                    None => (ACTUATOR_NEUTRAL_PCT, true),
                };
                Some(EsdDirective {
                    command: ActuatorCommand::clamped(valve, heater),
                    relief,
                    purge,
                })
            }
        }
    }
}

impl Default for EsdSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Both variables present and inside the recovery band around the safe
/// targets (±5 kPa / ±3 °C).
fn in_band(measurements: &Measurements) -> bool {
    let (Some(p), Some(t)) = (measurements.pressure_kpa, measurements.temperature_c) else {
        return false;
    };
    (p - PRESSURE_SAFE_TARGET_KPA).abs() <= ESD_PRESSURE_TOLERANCE_KPA
        && (t - TEMPERATURE_SAFE_TARGET_C).abs() <= ESD_TEMPERATURE_TOLERANCE_C
}
