//! Serial record formatting and telemetry emission.
//!
//! ## Record Format
//!
//! One CSV-style record per tick on the high-rate serial channel, ten
//! fields in fixed order:
//!
//! ```text
//! P:312.5,T:151.2,MV:43.8,SH:48.8,F:A,M:PRESION,ESD:Desactivado,ESTADO:Normal,RELIEF:No,PURGE:No
//! ```
//!
//! The field vocabulary (including the Spanish status labels) is the
//! installed operator console's; downstream consumers key on the exact
//! strings, so they are frozen here.
//!
//! ## Cadence
//!
//! * Serial record: every tick.
//! * Publish channel: pressure and temperature feeds every
//!   `publish_interval` ticks (tick 0 included).
//! * Capability announcement: once, before the first publish.
//!
//! Sink failures are dropped-and-counted, never propagated: telemetry
//! must not perturb the tick.

use core::fmt::Write as _;

use heapless::String as HString;
use tracing::{debug, warn};

use vapor_common::io::{FeedPublisher, SerialSink};
use vapor_common::state::{EsdPhase, SafetyLevel, SystemMode};
use vapor_common::telemetry::{
    Announcement, FeedMessage, TelemetrySnapshot, FEED_PRESSURE, FEED_TEMPERATURE,
};

/// Capacity of one formatted serial record. The worst-case record is
/// well under half of this.
pub const SERIAL_LINE_CAP: usize = 192;

// ─── Record Formatting ───────────────────────────────────────────────────

/// Resolve the `ESTADO` field. Highest-priority condition wins.
pub fn estado_label(snapshot: &TelemetrySnapshot) -> &'static str {
    if snapshot.esd_engaged() {
        return if snapshot.esd_phase == EsdPhase::ReadyForReset {
            "Listo para el Reinicio"
        } else {
            "No Listo para el Reinicio"
        };
    }
    match snapshot.system_mode {
        SystemMode::Recovery => return "Recuperación Presión",
        SystemMode::Preheat => return "Precalentamiento",
        _ => {}
    }
    if snapshot.pressure_level.is_warning() || snapshot.pressure_level.is_emergency() {
        return "Advertencia Presión";
    }
    match snapshot.temperature_level {
        SafetyLevel::Emergency => "Corrección Temperatura",
        SafetyLevel::WarningHigh | SafetyLevel::WarningLow => "Advertencia Temperatura",
        SafetyLevel::Normal => "Normal",
    }
}

#[inline]
const fn si_no(flag: bool) -> &'static str {
    if flag {
        "Si"
    } else {
        "No"
    }
}

/// Format one serial record. Values are the last-good readings carried
/// in the snapshot, so the record never contains NaN.
pub fn format_serial_line(snapshot: &TelemetrySnapshot) -> HString<SERIAL_LINE_CAP> {
    let mut line = HString::new();
    // Capacity covers the worst-case record; overflow would truncate.
    let _ = write!(
        line,
        "P:{:.1},T:{:.1},MV:{:.1},SH:{:.1},F:{},M:{},ESD:{},ESTADO:{},RELIEF:{},PURGE:{}",
        snapshot.pressure_kpa,
        snapshot.temperature_c,
        snapshot.valve_pct,
        snapshot.heater_pct,
        snapshot.flow.label(),
        snapshot.operating_mode.label(),
        if snapshot.esd_engaged() {
            "Activado"
        } else {
            "Desactivado"
        },
        estado_label(snapshot),
        si_no(snapshot.relief_open),
        si_no(snapshot.purge_open),
    );
    line
}

// ─── Emitter ─────────────────────────────────────────────────────────────

/// Drives both telemetry sinks from the per-tick snapshot.
#[derive(Debug)]
pub struct TelemetryEmitter {
    publish_interval: u64,
    announcement: Announcement,
    announced: bool,
    serial_fault_logged: bool,
    publish_fault_logged: bool,
}

impl TelemetryEmitter {
    pub fn new(publish_interval: u64, announcement: Announcement) -> Self {
        Self {
            publish_interval: publish_interval.max(1),
            announcement,
            announced: false,
            serial_fault_logged: false,
            publish_fault_logged: false,
        }
    }

    /// Emit everything due at this snapshot's tick.
    pub fn emit(
        &mut self,
        snapshot: &TelemetrySnapshot,
        serial: &mut dyn SerialSink,
        publisher: &mut dyn FeedPublisher,
    ) {
        if !self.announced {
            // One shot, attempted once: a lost announcement is not worth
            // re-sending on a channel without acks.
            self.announced = true;
            if let Err(e) = publisher.announce(&self.announcement) {
                warn!(error = %e, "capability announcement dropped");
            }
        }

        let line = format_serial_line(snapshot);
        match serial.write_line(&line) {
            Ok(()) => self.serial_fault_logged = false,
            Err(e) => {
                if self.serial_fault_logged {
                    debug!(error = %e, "serial record dropped");
                } else {
                    warn!(error = %e, "serial record dropped");
                    self.serial_fault_logged = true;
                }
            }
        }

        if snapshot.tick % self.publish_interval == 0 {
            let feeds = [
                FeedMessage::new(FEED_PRESSURE, snapshot.pressure_kpa),
                FeedMessage::new(FEED_TEMPERATURE, snapshot.temperature_c),
            ];
            let mut all_ok = true;
            for message in &feeds {
                if let Err(e) = publisher.publish(message) {
                    all_ok = false;
                    if self.publish_fault_logged {
                        debug!(feed = %message.feed, error = %e, "feed publish dropped");
                    } else {
                        warn!(feed = %message.feed, error = %e, "feed publish dropped");
                        self.publish_fault_logged = true;
                    }
                }
            }
            if all_ok {
                self.publish_fault_logged = false;
            }
        }
    }
}
