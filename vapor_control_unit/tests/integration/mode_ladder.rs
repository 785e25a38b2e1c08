//! Integration test: operating-mode ladder.
//!
//! Exercises the mode controller through the full decision core:
//! Recovery/Preheat entry and hysteresis exit, their priority order,
//! mode toggling with the beacon animation, and rotary setpoint
//! adjustment with clamping.

use vapor_common::config::VaporConfig;
use vapor_common::io::RawInputs;
use vapor_common::process::Measurements;
use vapor_common::state::{FlowState, OperatingMode, SystemMode};
use vapor_control_unit::cycle::ControlLoop;
use vapor_control_unit::indicator::{BLUE, GREEN};
use vapor_control_unit::telemetry::estado_label;

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

fn toggle_press() -> RawInputs {
    RawInputs {
        mode_button_down: true,
        ..RawInputs::default()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn low_pressure_rides_the_recovery_ladder() {
    let mut core = core();

    // Entry at the threshold: valve seals, flow is suppressed.
    let out = core.tick(idle(), &m(220.0, 150.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Recovery);
    assert_eq!(out.command.valve_pct, 0.0);
    assert_eq!(out.flow, FlowState::None);
    assert_eq!(estado_label(&out.snapshot), "Recuperación Presión");

    // Reaching the exit threshold is not enough; exit is strictly above.
    let out = core.tick(idle(), &m(240.0, 150.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Recovery);
    let out = core.tick(idle(), &m(240.1, 150.0));
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
}

#[test]
fn cold_start_preheats_until_the_exit_threshold() {
    let mut core = core();

    let out = core.tick(idle(), &m(300.0, 105.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Preheat);
    assert_eq!(out.command.heater_pct, 100.0);
    assert_eq!(estado_label(&out.snapshot), "Precalentamiento");

    // Holds across the hysteresis band.
    let out = core.tick(idle(), &m(300.0, 125.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Preheat);

    // Exit hands the heater back to tracking.
    let out = core.tick(idle(), &m(300.0, 130.1));
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
    assert!((out.command.heater_pct - 69.9).abs() < 1e-9);
}

#[test]
fn recovery_outranks_preheat() {
    let mut core = core();

    // Both triggers low: pressure wins.
    let out = core.tick(idle(), &m(215.0, 105.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Recovery);

    // Pressure recovers; the cold superheater takes its turn one tick
    // after the restore.
    let out = core.tick(idle(), &m(245.0, 105.0));
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
    let out = core.tick(idle(), &m(245.0, 105.0));
    assert_eq!(out.snapshot.system_mode, SystemMode::Preheat);
}

#[test]
fn toggle_and_rotary_drive_the_temperature_setpoint() {
    let mut core = core();
    let nominal = m(300.0, 150.0);

    core.tick(toggle_press(), &nominal);
    let out = core.tick(toggle_press(), &nominal);
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Temperature)
    );

    // Rotary now adjusts temperature at 1 °C per detent.
    let spin = RawInputs {
        rotary_delta: 4,
        ..RawInputs::default()
    };
    core.tick(spin, &nominal);
    assert_eq!(core.setpoints().temperature_c, 154.0);
    assert_eq!(core.setpoints().pressure_kpa, 300.0);

    // The heater chases the new target.
    let out = core.tick(idle(), &nominal);
    assert_eq!(out.command.heater_pct, 54.0);
}

#[test]
fn pressure_setpoint_clamps_at_the_limits() {
    let mut core = core();
    let nominal = m(300.0, 150.0);

    let crank = RawInputs {
        rotary_delta: 100,
        ..RawInputs::default()
    };
    core.tick(crank, &nominal);
    assert_eq!(core.setpoints().pressure_kpa, 450.0);

    let wind_down = RawInputs {
        rotary_delta: -500,
        ..RawInputs::default()
    };
    core.tick(wind_down, &nominal);
    assert_eq!(core.setpoints().pressure_kpa, 150.0);
}

#[test]
fn toggle_is_ignored_outside_normal() {
    let mut core = core();
    let low = m(215.0, 150.0);

    core.tick(idle(), &low);
    core.tick(toggle_press(), &low);
    let out = core.tick(toggle_press(), &low);
    assert_eq!(out.snapshot.system_mode, SystemMode::Recovery);

    // Exit restores the pressure mode that was never toggled away.
    let out = core.tick(idle(), &m(245.0, 150.0));
    assert_eq!(
        out.snapshot.system_mode,
        SystemMode::Normal(OperatingMode::Pressure)
    );
}

#[test]
fn toggle_animation_plays_on_the_beacon() {
    let mut core = core();
    let nominal = m(300.0, 150.0);

    core.tick(toggle_press(), &nominal);
    // Switching to temperature: the accent frame lands first.
    let toggled = core.tick(toggle_press(), &nominal);
    assert_eq!(toggled.indicator.color, BLUE);

    let frames: Vec<_> = (0..4)
        .map(|_| core.tick(idle(), &nominal).indicator.color)
        .collect();
    assert_eq!(frames[0], GREEN);
    assert_eq!(frames[1], BLUE);
    assert_eq!(frames[2], GREEN);
    // Animation exhausted: steady green from here on.
    assert_eq!(frames[3], GREEN);
}
