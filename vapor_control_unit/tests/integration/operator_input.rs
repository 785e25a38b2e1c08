//! Integration test: scripted operator input against the decision core.
//!
//! The tapes use the same `[[event]]` TOML the `--scenario` flag loads.
//! Button entries are levels, not edges, so a debounced press appears
//! on two consecutive ticks.

use vapor_common::config::VaporConfig;
use vapor_common::io::InputSource;
use vapor_common::process::Measurements;
use vapor_common::state::{EsdPhase, OperatingMode, SystemMode};
use vapor_control_unit::cycle::ControlLoop;
use vapor_hal::{NullOperator, ScriptedOperator};

// ── Helpers ─────────────────────────────────────────────────────────

fn core() -> ControlLoop {
    ControlLoop::new(&VaporConfig::default())
}

fn nominal() -> Measurements {
    Measurements {
        pressure_kpa: Some(300.0),
        temperature_c: Some(150.0),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn scripted_tape_replays_against_the_core() {
    const TAPE: &str = r#"
[[event]]
tick = 2
rotary_delta = 5

[[event]]
tick = 4
mode_button = true

[[event]]
tick = 5
mode_button = true

[[event]]
tick = 7
rotary_delta = -3
"#;

    let mut core = core();
    let mut operator = ScriptedOperator::from_toml_str(TAPE).unwrap();

    for _ in 0..10 {
        let raw = operator.poll();
        core.tick(raw, &nominal());
    }

    // Tick 2 moved the pressure target, ticks 4-5 toggled the mode,
    // tick 7 trimmed the temperature target.
    assert_eq!(core.mode(), SystemMode::Normal(OperatingMode::Temperature));
    assert_eq!(core.setpoints().pressure_kpa, 310.0);
    assert_eq!(core.setpoints().temperature_c, 147.0);
    assert_eq!(operator.remaining(), 0);
}

#[test]
fn scripted_esd_press_and_reset() {
    const TAPE: &str = r#"
[[event]]
tick = 1
esd_button = true

[[event]]
tick = 2
esd_button = true

[[event]]
tick = 6
esd_button = true

[[event]]
tick = 7
esd_button = true
"#;

    let mut core = core();
    let mut operator = ScriptedOperator::from_toml_str(TAPE).unwrap();

    let mut phases = Vec::new();
    for _ in 0..9 {
        let raw = operator.poll();
        let out = core.tick(raw, &nominal());
        phases.push(out.snapshot.esd_phase);
    }

    use EsdPhase::*;
    assert_eq!(
        phases,
        [
            Inactive,      // 0: idle
            Inactive,      // 1: press held, debounce still open
            Active,        // 2: edge fires, shutdown engages
            Recovering,    // 3: dump engaged
            ReadyForReset, // 4: already in band
            ReadyForReset, // 5: latched
            ReadyForReset, // 6: reset press held
            Inactive,      // 7: reset edge releases
            Inactive,      // 8: back under operator control
        ]
    );
    assert_eq!(core.mode(), SystemMode::Normal(OperatingMode::Pressure));
}

#[test]
fn null_operator_leaves_the_core_untouched() {
    let mut core = core();
    let mut operator = NullOperator;

    for _ in 0..5 {
        let raw = operator.poll();
        core.tick(raw, &nominal());
    }

    assert_eq!(core.mode(), SystemMode::Normal(OperatingMode::Pressure));
    assert_eq!(core.setpoints().pressure_kpa, 300.0);
    assert_eq!(core.setpoints().temperature_c, 150.0);
}
