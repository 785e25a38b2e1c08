//! Top-level system mode ladder.
//!
//! One transition priority order, evaluated once per tick:
//!
//! 1. ESD phase engaged (or just released) — the sequencer owns the mode.
//! 2. Pressure at or below the Recovery entry threshold → `Recovery`
//!    (never from Preheat; Recovery and Preheat are mutually exclusive).
//! 3. Recovery exits above the hysteresis threshold, back to the
//!    remembered operating mode.
//! 4. Temperature at or below the Preheat entry threshold → `Preheat`.
//! 5. Preheat exits above its hysteresis threshold.
//! 6. Mode-toggle press while under normal regulation switches the
//!    operating mode (with an indicator animation side effect).
//! 7. Otherwise remain.
//!
//! The operating mode active before any special mode is remembered and
//! restored on exit, including after an ESD reset.

use tracing::info;

use vapor_common::config::SetpointConfig;
use vapor_common::consts::{
    PRESSURE_RECOVERY_ENTER_KPA, PRESSURE_RECOVERY_EXIT_KPA, ROTARY_PRESSURE_KPA_PER_DETENT,
    ROTARY_TEMPERATURE_C_PER_DETENT, TEMPERATURE_PREHEAT_ENTER_C, TEMPERATURE_PREHEAT_EXIT_C,
};
use vapor_common::prelude::*;

/// One tick's mode resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: SystemMode,
    /// `Some(new mode)` when a toggle was accepted this tick; drives the
    /// indicator animation.
    pub toggled: Option<OperatingMode>,
}

/// Owns the system mode, the remembered operating mode, and the
/// operator setpoints.
#[derive(Debug)]
pub struct ModeController {
    mode: SystemMode,
    remembered: OperatingMode,
    setpoints: Setpoints,
    limits: SetpointConfig,
}

impl ModeController {
    pub fn new(limits: &SetpointConfig) -> Self {
        Self {
            mode: SystemMode::default(),
            remembered: OperatingMode::default(),
            setpoints: Setpoints {
                pressure_kpa: limits.pressure_initial_kpa,
                temperature_c: limits.temperature_initial_c,
            },
            limits: *limits,
        }
    }

    pub const fn mode(&self) -> SystemMode {
        self.mode
    }

    pub const fn setpoints(&self) -> Setpoints {
        self.setpoints
    }

    /// The operating mode shown to the operator: the active one under
    /// normal regulation, the remembered one during special modes.
    pub const fn operating_mode(&self) -> OperatingMode {
        match self.mode.operating_mode() {
            Some(mode) => mode,
            None => self.remembered,
        }
    }

    /// Apply rotary detents to the active mode's setpoint, silently
    /// clamped to the configured range. Inert outside normal regulation.
    pub fn apply_setpoint_delta(&mut self, detents: i32) {
        if detents == 0 || !self.mode.allows_setpoint_adjust() {
            return;
        }
        match self.operating_mode() {
            OperatingMode::Pressure => {
                let target = self.setpoints.pressure_kpa
                    + f64::from(detents) * ROTARY_PRESSURE_KPA_PER_DETENT;
                self.setpoints.pressure_kpa =
                    target.clamp(self.limits.pressure_min_kpa, self.limits.pressure_max_kpa);
            }
            OperatingMode::Temperature => {
                let target = self.setpoints.temperature_c
                    + f64::from(detents) * ROTARY_TEMPERATURE_C_PER_DETENT;
                self.setpoints.temperature_c =
                    target.clamp(self.limits.temperature_min_c, self.limits.temperature_max_c);
            }
        }
    }

    /// Run the transition ladder for one tick.
    pub fn step(
        &mut self,
        esd_phase: EsdPhase,
        measurements: &Measurements,
        toggle_edge: bool,
    ) -> ModeDecision {
        // 1. The ESD sequencer owns the mode while engaged.
        if esd_phase.is_engaged() {
            let next = SystemMode::Esd(esd_phase);
            if self.mode != next {
                self.transition(next);
            }
            return self.decided(None);
        }
        if self.mode.is_esd() {
            // Reset observed: restore the remembered operating mode; the
            // ladder re-evaluates from there next tick.
            self.transition(SystemMode::Normal(self.remembered));
            return self.decided(None);
        }

        let pressure = measurements.pressure_kpa;
        let temperature = measurements.temperature_c;

        match self.mode {
            SystemMode::Normal(active) => {
                self.remembered = active;
                if pressure.is_some_and(|p| p <= PRESSURE_RECOVERY_ENTER_KPA) {
                    self.transition(SystemMode::Recovery);
                } else if temperature.is_some_and(|t| t <= TEMPERATURE_PREHEAT_ENTER_C) {
                    self.transition(SystemMode::Preheat);
                } else if toggle_edge {
                    let next = active.toggled();
                    self.remembered = next;
                    self.transition(SystemMode::Normal(next));
                    return self.decided(Some(next));
                }
            }
            SystemMode::Recovery => {
                if pressure.is_some_and(|p| p > PRESSURE_RECOVERY_EXIT_KPA) {
                    self.transition(SystemMode::Normal(self.remembered));
                }
            }
            SystemMode::Preheat => {
                if temperature.is_some_and(|t| t > TEMPERATURE_PREHEAT_EXIT_C) {
                    self.transition(SystemMode::Normal(self.remembered));
                }
            }
            // Handled above; the sequencer is the only way in or out.
            SystemMode::Esd(_) => {}
        }
        self.decided(None)
    }

    fn transition(&mut self, next: SystemMode) {
        info!(from = ?self.mode, to = ?next, "system mode transition");
        self.mode = next;
    }

    const fn decided(&self, toggled: Option<OperatingMode>) -> ModeDecision {
        ModeDecision {
            mode: self.mode,
            toggled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements(p: f64, t: f64) -> Measurements {
        Measurements {
            pressure_kpa: Some(p),
            temperature_c: Some(t),
        }
    }

    fn controller() -> ModeController {
        ModeController::new(&SetpointConfig::default())
    }

    #[test]
    fn stays_normal_at_targets() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), false);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
        assert_eq!(d.toggled, None);
    }

    #[test]
    fn low_pressure_enters_recovery() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        assert_eq!(d.mode, SystemMode::Recovery);
    }

    #[test]
    fn recovery_exit_uses_hysteresis() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        // At the exit threshold exactly: still recovering.
        let d = c.step(EsdPhase::Inactive, &measurements(240.0, 150.0), false);
        assert_eq!(d.mode, SystemMode::Recovery);
        let d = c.step(EsdPhase::Inactive, &measurements(240.1, 150.0), false);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
    }

    #[test]
    fn recovery_restores_the_toggled_mode() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        assert_eq!(c.mode(), SystemMode::Normal(OperatingMode::Temperature));
        c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        assert_eq!(c.mode(), SystemMode::Recovery);
        c.step(EsdPhase::Inactive, &measurements(245.0, 150.0), false);
        assert_eq!(c.mode(), SystemMode::Normal(OperatingMode::Temperature));
    }

    #[test]
    fn cold_superheater_enters_preheat() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 105.0), false);
        assert_eq!(d.mode, SystemMode::Preheat);
        // Holds through the hysteresis band.
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 125.0), false);
        assert_eq!(d.mode, SystemMode::Preheat);
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 130.1), false);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
    }

    #[test]
    fn recovery_wins_simultaneous_triggers() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &measurements(215.0, 105.0), false);
        assert_eq!(d.mode, SystemMode::Recovery);
        // Pressure restored while temperature is still cold: back to
        // Normal this tick, Preheat picks it up on the next.
        let d = c.step(EsdPhase::Inactive, &measurements(245.0, 105.0), false);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
        let d = c.step(EsdPhase::Inactive, &measurements(245.0, 105.0), false);
        assert_eq!(d.mode, SystemMode::Preheat);
    }

    #[test]
    fn preheat_does_not_yield_to_recovery() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(300.0, 105.0), false);
        assert_eq!(c.mode(), SystemMode::Preheat);
        // Low pressure while preheating: Preheat holds (only ESD overrides).
        let d = c.step(EsdPhase::Inactive, &measurements(215.0, 105.0), false);
        assert_eq!(d.mode, SystemMode::Preheat);
    }

    #[test]
    fn toggle_switches_operating_mode() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Temperature));
        assert_eq!(d.toggled, Some(OperatingMode::Temperature));
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
        assert_eq!(d.toggled, Some(OperatingMode::Pressure));
    }

    #[test]
    fn toggle_is_inert_in_special_modes() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        let d = c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), true);
        assert_eq!(d.mode, SystemMode::Recovery);
        assert_eq!(d.toggled, None);
    }

    #[test]
    fn esd_overrides_everything() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(215.0, 105.0), false);
        let d = c.step(EsdPhase::Active, &measurements(215.0, 105.0), true);
        assert_eq!(d.mode, SystemMode::Esd(EsdPhase::Active));
        assert_eq!(d.toggled, None);
        // Phase advances are tracked.
        let d = c.step(EsdPhase::Recovering, &measurements(300.0, 150.0), false);
        assert_eq!(d.mode, SystemMode::Esd(EsdPhase::Recovering));
    }

    #[test]
    fn esd_reset_restores_remembered_mode() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        c.step(EsdPhase::Active, &measurements(465.0, 150.0), false);
        c.step(EsdPhase::Recovering, &measurements(400.0, 150.0), false);
        c.step(EsdPhase::ReadyForReset, &measurements(300.0, 150.0), false);
        // Reset released the sequencer: remembered mode comes back.
        let d = c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), false);
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Temperature));
    }

    #[test]
    fn operating_mode_is_remembered_during_special_modes() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        assert_eq!(c.mode(), SystemMode::Recovery);
        assert_eq!(c.operating_mode(), OperatingMode::Temperature);
    }

    #[test]
    fn setpoint_delta_moves_active_target() {
        let mut c = controller();
        c.apply_setpoint_delta(5);
        assert_eq!(c.setpoints().pressure_kpa, 310.0);
        assert_eq!(c.setpoints().temperature_c, 150.0);

        c.step(EsdPhase::Inactive, &measurements(300.0, 150.0), true);
        c.apply_setpoint_delta(-10);
        assert_eq!(c.setpoints().temperature_c, 140.0);
        assert_eq!(c.setpoints().pressure_kpa, 310.0);
    }

    #[test]
    fn setpoint_clamps_to_configured_range() {
        let mut c = controller();
        c.apply_setpoint_delta(1000);
        assert_eq!(c.setpoints().pressure_kpa, 450.0);
        c.apply_setpoint_delta(-10_000);
        assert_eq!(c.setpoints().pressure_kpa, 150.0);
    }

    #[test]
    fn setpoint_delta_inert_outside_normal() {
        let mut c = controller();
        c.step(EsdPhase::Inactive, &measurements(215.0, 150.0), false);
        c.apply_setpoint_delta(5);
        assert_eq!(c.setpoints().pressure_kpa, 300.0);
    }

    #[test]
    fn unavailable_readings_do_not_move_the_ladder() {
        let mut c = controller();
        let d = c.step(EsdPhase::Inactive, &Measurements::default(), false);
        // Classification handles fail-closed; the ladder itself holds.
        assert_eq!(d.mode, SystemMode::Normal(OperatingMode::Pressure));
    }
}
