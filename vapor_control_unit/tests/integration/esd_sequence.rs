//! Integration test: emergency shutdown lifecycle.
//!
//! Drives the full decision core (sampler → supervisor → sequencer →
//! mode ladder → output assembly) through complete shutdown episodes:
//! 1. Automatic engagement one tick after an emergency classification
//! 2. Manual press → Active → Recovering → ReadyForReset → reset
//! 3. Fail-closed venting on a total sensor outage

use vapor_common::config::VaporConfig;
use vapor_common::io::RawInputs;
use vapor_common::process::{ActuatorCommand, DiscreteOutputs, Measurements};
use vapor_common::state::{EsdPhase, FlowState, OperatingMode, SafetyLevel, SystemMode};
use vapor_control_unit::cycle::ControlLoop;

// ── Helpers ─────────────────────────────────────────────────────────

fn core() -> ControlLoop {
    ControlLoop::new(&VaporConfig::default())
}

fn m(p: f64, t: f64) -> Measurements {
    Measurements {
        pressure_kpa: Some(p),
        temperature_c: Some(t),
    }
}

fn idle() -> RawInputs {
    RawInputs::default()
}

fn esd_press() -> RawInputs {
    RawInputs {
        esd_button_down: true,
        ..RawInputs::default()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn overpressure_trips_the_shutdown_one_tick_later() {
    let mut core = core();
    let hot = m(465.0, 150.0);

    // Tick n: emergency classified, but tracking is still in charge.
    let out = core.tick(idle(), &hot);
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
    assert_eq!(out.snapshot.esd_phase, EsdPhase::Inactive);
    assert_eq!(out.snapshot.pressure_level, SafetyLevel::Emergency);
    assert_eq!(out.command.valve_pct, 100.0);
    assert!(!out.discrete.contains(DiscreteOutputs::RELIEF));

    // Tick n+1: the latched emergency engages the sequencer and the
    // dump directive takes over: relief open, valve neutral, no flow.
    let out = core.tick(idle(), &hot);
    assert_eq!(out.snapshot.system_mode, SystemMode::Esd(EsdPhase::Active));
    assert!(out.discrete.contains(DiscreteOutputs::RELIEF));
    assert!(out.discrete.contains(DiscreteOutputs::LASER));
    assert!(!out.discrete.contains(DiscreteOutputs::PURGE));
    assert_eq!(out.command.valve_pct, 50.0);
    assert_eq!(out.flow, FlowState::None);
}

#[test]
fn manual_press_walks_the_full_lifecycle() {
    let mut core = core();
    let nominal = m(300.0, 150.0);

    // Debounce window is two ticks at the default config; the press
    // registers on the second held tick and engages immediately.
    core.tick(esd_press(), &nominal);
    let out = core.tick(esd_press(), &nominal);
    assert_eq!(out.snapshot.system_mode, SystemMode::Esd(EsdPhase::Active));
    // In-band directive holds neutral with the dump valves closed.
    assert_eq!(out.command, ActuatorCommand::NEUTRAL);
    assert!(out.discrete.is_empty());

    // Dump engaged next tick; ready as soon as both variables sit
    // inside the safe band (they already do).
    let out = core.tick(idle(), &nominal);
    assert_eq!(out.snapshot.esd_phase, EsdPhase::Recovering);
    let out = core.tick(idle(), &nominal);
    assert_eq!(out.snapshot.esd_phase, EsdPhase::ReadyForReset);

    // Ready is a latch: nothing moves without an operator press.
    for _ in 0..10 {
        let out = core.tick(idle(), &nominal);
        assert_eq!(out.snapshot.esd_phase, EsdPhase::ReadyForReset);
        assert_eq!(out.command, ActuatorCommand::NEUTRAL);
    }

    // Debounced reset press releases the latch and restores Normal.
    core.tick(esd_press(), &nominal);
    let out = core.tick(esd_press(), &nominal);
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
    assert_eq!(out.snapshot.esd_phase, EsdPhase::Inactive);
}

#[test]
fn reset_restores_the_remembered_operating_mode() {
    let mut core = core();
    let nominal = m(300.0, 150.0);
    let toggle = RawInputs {
        mode_button_down: true,
        ..RawInputs::default()
    };

    // Switch to temperature mode before the episode.
    core.tick(toggle, &nominal);
    let out = core.tick(toggle, &nominal);
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Temperature)
    );

    // Trip, recover, park ready.
    core.tick(esd_press(), &nominal);
    core.tick(esd_press(), &nominal);
    core.tick(idle(), &nominal);
    let out = core.tick(idle(), &nominal);
    assert_eq!(out.snapshot.esd_phase, EsdPhase::ReadyForReset);
    // The remembered mode stays visible in the snapshot meanwhile.
    assert_eq!(out.snapshot.operating_mode, OperatingMode::Temperature);

    // Reset lands back in temperature mode, not the default.
    core.tick(esd_press(), &nominal);
    let out = core.tick(esd_press(), &nominal);
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Temperature)
    );
}

#[test]
fn engaged_shutdown_ignores_the_rotary() {
    let mut core = core();
    let hot = m(465.0, 150.0);
    core.tick(idle(), &hot);
    core.tick(idle(), &hot);
    assert_eq!(core.mode(), SystemMode::Esd(EsdPhase::Active));

    let spin = RawInputs {
        rotary_delta: 10,
        ..RawInputs::default()
    };
    core.tick(spin, &hot);
    assert_eq!(core.setpoints().pressure_kpa, 300.0);
}

#[test]
fn sensor_outage_fails_closed() {
    let mut core = core();
    let dark = Measurements::default();

    // Classification is immediate even though the sequencer waits a tick.
    let out = core.tick(idle(), &dark);
    assert_eq!(out.snapshot.pressure_level, SafetyLevel::Emergency);
    assert_eq!(out.snapshot.temperature_level, SafetyLevel::Emergency);
    assert_eq!(out.snapshot.esd_phase, EsdPhase::Inactive);

    // Engaged; unavailable readings vent both paths.
    let out = core.tick(idle(), &dark);
    assert_eq!(out.snapshot.system_mode, SystemMode::Esd(EsdPhase::Active));
    assert!(out.discrete.contains(DiscreteOutputs::RELIEF));
    assert!(out.discrete.contains(DiscreteOutputs::PURGE));
    assert_eq!(out.command, ActuatorCommand::NEUTRAL);

    // Recovery can never complete while the readings stay dark.
    for _ in 0..20 {
        let out = core.tick(idle(), &dark);
        assert_eq!(out.snapshot.esd_phase, EsdPhase::Recovering);
    }
}
