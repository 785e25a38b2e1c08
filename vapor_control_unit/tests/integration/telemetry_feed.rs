//! Integration test: telemetry surface end to end.
//!
//! Runs the decision core against scripted readings and feeds every
//! snapshot through the emitter, asserting on the exact console records
//! and the publish-channel cadence.

use vapor_common::config::VaporConfig;
use vapor_common::io::{FeedPublisher, RawInputs, SerialSink, TelemetryError};
use vapor_common::process::Measurements;
use vapor_common::telemetry::{Announcement, FeedMessage};
use vapor_control_unit::config::load_config_from_str;
use vapor_control_unit::cycle::ControlLoop;
use vapor_control_unit::telemetry::TelemetryEmitter;

// ── Recording Sinks ─────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSerial {
    lines: Vec<String>,
}

impl SerialSink for RecordingSerial {
    fn write_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    announcements: usize,
    published: Vec<(String, f64)>,
}

impl FeedPublisher for RecordingPublisher {
    fn announce(&mut self, _announcement: &Announcement) -> Result<(), TelemetryError> {
        self.announcements += 1;
        Ok(())
    }

    fn publish(&mut self, message: &FeedMessage) -> Result<(), TelemetryError> {
        self.published
            .push((message.feed.as_str().to_owned(), message.value[0]));
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn m(p: f64, t: f64) -> Measurements {
    Measurements {
        pressure_kpa: Some(p),
        temperature_c: Some(t),
    }
}

fn emitter_for(config: &VaporConfig) -> TelemetryEmitter {
    TelemetryEmitter::new(
        config.control.publish_interval_ticks,
        Announcement::new(&config.telemetry.device_name, "0.1.0"),
    )
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn nominal_session_emits_the_console_records() {
    let config = VaporConfig::default();
    let mut core = ControlLoop::new(&config);
    let mut emitter = emitter_for(&config);
    let mut serial = RecordingSerial::default();
    let mut publisher = RecordingPublisher::default();

    for _ in 0..3 {
        let out = core.tick(RawInputs::default(), &m(300.0, 150.0));
        emitter.emit(&out.snapshot, &mut serial, &mut publisher);
    }

    assert_eq!(serial.lines.len(), 3);
    assert_eq!(
        serial.lines[0],
        "P:300.0,T:150.0,MV:50.0,SH:50.0,F:None,M:PRESION,\
         ESD:Desactivado,ESTADO:Normal,RELIEF:No,PURGE:No"
    );
    assert_eq!(publisher.announcements, 1);
    // Only tick 0 hits the default 50-tick publish cadence.
    assert_eq!(
        publisher.published,
        vec![
            ("pressure".to_string(), 300.0),
            ("temperature".to_string(), 150.0),
        ]
    );
}

#[test]
fn shutdown_session_narrates_the_esd_states() {
    let config = VaporConfig::default();
    let mut core = ControlLoop::new(&config);
    let mut emitter = emitter_for(&config);
    let mut serial = RecordingSerial::default();
    let mut publisher = RecordingPublisher::default();

    // Two hot ticks trip the shutdown, then the rig reads safe.
    for reading in [
        m(465.0, 150.0),
        m(465.0, 150.0),
        m(300.0, 150.0),
        m(300.0, 150.0),
    ] {
        let out = core.tick(RawInputs::default(), &reading);
        emitter.emit(&out.snapshot, &mut serial, &mut publisher);
    }

    // Tick 0: emergency classified, shutdown not yet engaged.
    assert!(serial.lines[0].contains("ESD:Desactivado"));
    assert!(serial.lines[0].contains("ESTADO:Advertencia Presión"));
    // Tick 1: engaged, relief venting.
    assert!(serial.lines[1].contains("ESD:Activado"));
    assert!(serial.lines[1].contains("RELIEF:Si"));
    assert!(serial.lines[1].contains("ESTADO:No Listo para el Reinicio"));
    // Tick 3: both variables in band, parked awaiting reset.
    assert!(serial.lines[3].contains("ESTADO:Listo para el Reinicio"));
    assert!(serial.lines[3].contains("RELIEF:No"));

    // The tick-0 feed carried the live emergency value.
    assert_eq!(publisher.published[0], ("pressure".to_string(), 465.0));
}

#[test]
fn outage_freezes_the_record_at_last_good_readings() {
    let config = VaporConfig::default();
    let mut core = ControlLoop::new(&config);
    let mut emitter = emitter_for(&config);
    let mut serial = RecordingSerial::default();
    let mut publisher = RecordingPublisher::default();

    let out = core.tick(RawInputs::default(), &m(312.5, 151.2));
    emitter.emit(&out.snapshot, &mut serial, &mut publisher);
    let out = core.tick(RawInputs::default(), &Measurements::default());
    emitter.emit(&out.snapshot, &mut serial, &mut publisher);

    // The record keeps the last finite readings; ESTADO reports the
    // live fail-closed classification.
    assert!(serial.lines[1].starts_with("P:312.5,T:151.2"));
    assert!(serial.lines[1].contains("ESTADO:Advertencia Presión"));
}

#[test]
fn configured_cadence_paces_the_feed() {
    let config = load_config_from_str(
        r#"
[control]
publish_interval_ticks = 10
"#,
    )
    .unwrap();
    let mut core = ControlLoop::new(&config);
    let mut emitter = emitter_for(&config);
    let mut serial = RecordingSerial::default();
    let mut publisher = RecordingPublisher::default();

    for _ in 0..25 {
        let out = core.tick(RawInputs::default(), &m(300.0, 150.0));
        emitter.emit(&out.snapshot, &mut serial, &mut publisher);
    }

    // Ticks 0, 10 and 20; a pressure and a temperature feed each.
    assert_eq!(serial.lines.len(), 25);
    assert_eq!(publisher.published.len(), 6);
    assert_eq!(publisher.announcements, 1);
}
