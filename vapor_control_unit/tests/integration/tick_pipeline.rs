//! Integration test: full cycle pipeline.
//!
//! Wires the runner to the simulated plant and real drivers where
//! possible: scripted operator tapes, the tracing actuator/indicator
//! sinks, and shared recording telemetry sinks. `step()` drives the
//! read → process → write body without wall-clock pacing; one test
//! exercises the paced loop with a tick limit.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use vapor_common::config::VaporConfig;
use vapor_common::io::{FeedPublisher, SerialSink, TelemetryError};
use vapor_common::state::{EsdPhase, OperatingMode, SystemMode};
use vapor_common::telemetry::{Announcement, FeedMessage};
use vapor_control_unit::cycle::{CycleRunner, Ports};
use vapor_hal::{NullOperator, ScriptedOperator, SimulatedPlant, TracingActuator, TracingIndicator};

// ── Shared Recording Sinks ──────────────────────────────────────────
//
// The runner owns its ports, so the test side keeps cloned handles.

#[derive(Default, Clone)]
struct SharedSerial {
    lines: Arc<Mutex<Vec<String>>>,
}

impl SerialSink for SharedSerial {
    fn write_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        self.lines.lock().unwrap().push(line.to_owned());
        Ok(())
    }
}

#[derive(Default, Clone)]
struct SharedPublisher {
    announcements: Arc<Mutex<usize>>,
    published: Arc<Mutex<Vec<(String, f64)>>>,
}

impl FeedPublisher for SharedPublisher {
    fn announce(&mut self, _announcement: &Announcement) -> Result<(), TelemetryError> {
        *self.announcements.lock().unwrap() += 1;
        Ok(())
    }

    fn publish(&mut self, message: &FeedMessage) -> Result<(), TelemetryError> {
        self.published
            .lock()
            .unwrap()
            .push((message.feed.as_str().to_owned(), message.value[0]));
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn runner_with(
    config: &VaporConfig,
    inputs: Box<dyn vapor_common::io::InputSource>,
    serial: &SharedSerial,
    publisher: &SharedPublisher,
) -> CycleRunner {
    let ports = Ports {
        plant: Box::new(SimulatedPlant::new(&config.plant)),
        inputs,
        actuators: Box::new(TracingActuator::default()),
        indicator: Box::new(TracingIndicator::default()),
        serial: Box::new(serial.clone()),
        publisher: Box::new(publisher.clone()),
    };
    let announcement = Announcement::new(&config.telemetry.device_name, "0.1.0");
    CycleRunner::new(config, ports, announcement)
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn steady_rig_session_holds_neutral() {
    let config = VaporConfig::default();
    let serial = SharedSerial::default();
    let publisher = SharedPublisher::default();
    let mut runner = runner_with(&config, Box::new(NullOperator), &serial, &publisher);

    for _ in 0..10 {
        runner.step();
    }

    let lines = serial.lines.lock().unwrap();
    assert_eq!(lines.len(), 10);
    // The stock rig starts at the safe targets and stays there.
    for line in lines.iter() {
        assert!(line.starts_with("P:300.0,T:150.0,MV:50.0,SH:50.0"), "{line}");
        assert!(line.contains("ESTADO:Normal"));
    }
    assert_eq!(*publisher.announcements.lock().unwrap(), 1);
    // Default cadence: only tick 0 publishes inside this window.
    assert_eq!(publisher.published.lock().unwrap().len(), 2);
    assert_eq!(runner.core().tick_index(), 10);
}

#[test]
fn overpressure_start_vents_and_parks_ready() {
    let mut config = VaporConfig::default();
    config.plant.initial_pressure_kpa = 470.0;
    let serial = SharedSerial::default();
    let publisher = SharedPublisher::default();
    let mut runner = runner_with(&config, Box::new(NullOperator), &serial, &publisher);

    // The relief bleed closes 2 % of the error per tick; give it room.
    for _ in 0..220 {
        runner.step();
    }

    assert_eq!(runner.core().mode(), SystemMode::Esd(EsdPhase::ReadyForReset));

    let lines = serial.lines.lock().unwrap();
    assert!(lines[0].starts_with("P:470.0"), "{}", lines[0]);
    assert!(lines[0].contains("ESTADO:Advertencia Presión"));
    // Engaged one tick later, venting through the relief valve.
    assert!(lines[1].contains("ESD:Activado"));
    assert!(lines[1].contains("RELIEF:Si"));
    // Parked in the hold band with the dump valves closed again.
    let last = lines.last().unwrap();
    assert!(last.contains("ESTADO:Listo para el Reinicio"), "{last}");
    assert!(last.contains("RELIEF:No"));
}

#[test]
fn scripted_reset_returns_the_rig_to_normal() {
    const TAPE: &str = r#"
[[event]]
tick = 200
esd_button = true

[[event]]
tick = 201
esd_button = true
"#;

    let mut config = VaporConfig::default();
    config.plant.initial_pressure_kpa = 470.0;
    let serial = SharedSerial::default();
    let publisher = SharedPublisher::default();
    let operator = ScriptedOperator::from_toml_str(TAPE).unwrap();
    let mut runner = runner_with(&config, Box::new(operator), &serial, &publisher);

    for _ in 0..210 {
        runner.step();
    }

    // Recovery finished well before tick 200; the scripted press
    // releases the latch and hands the rig back to the operator.
    assert_eq!(
        runner.core().mode(),
        SystemMode::Normal(OperatingMode::Pressure)
    );
    let lines = serial.lines.lock().unwrap();
    let last = lines.last().unwrap();
    assert!(last.contains("ESD:Desactivado"), "{last}");
    assert!(last.contains("ESTADO:Normal"));
}

#[test]
fn bounded_run_honors_the_tick_limit() {
    let mut config = VaporConfig::default();
    config.control.tick_period_ms = 10;
    let serial = SharedSerial::default();
    let publisher = SharedPublisher::default();
    let mut runner = runner_with(&config, Box::new(NullOperator), &serial, &publisher);
    runner.set_tick_limit(Some(5));

    let running = AtomicBool::new(true);
    runner.run(&running).unwrap();

    assert_eq!(runner.stats.cycle_count, 5);
    assert_eq!(runner.core().tick_index(), 5);
    assert_eq!(serial.lines.lock().unwrap().len(), 5);
}
