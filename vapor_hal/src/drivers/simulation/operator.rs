//! Operator input sources for unattended runs.
//!
//! `NullOperator` is a dead panel. `ScriptedOperator` replays a TOML
//! tape of events keyed to absolute tick indices, which makes rig
//! sessions reproducible tick for tick.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use vapor_common::io::{InputSource, RawInputs};

use crate::error::HalError;

/// Input source that never reports operator activity.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOperator;

impl InputSource for NullOperator {
    fn poll(&mut self) -> RawInputs {
        RawInputs::default()
    }
}

/// One scripted input event.
#[derive(Debug, Clone, Copy, Deserialize)]
struct ScriptedEvent {
    tick: u64,
    #[serde(default)]
    rotary_delta: i32,
    #[serde(default)]
    mode_button: bool,
    #[serde(default)]
    esd_button: bool,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    event: Vec<ScriptedEvent>,
}

/// Replays a TOML tape of operator events against the tick counter.
///
/// Ticks without an event poll as idle. Button *levels* are scripted,
/// not presses, so a debounced press needs the level held across
/// consecutive ticks:
///
/// ```toml
/// [[event]]
/// tick = 10
/// esd_button = true
///
/// [[event]]
/// tick = 11
/// esd_button = true
/// ```
#[derive(Debug)]
pub struct ScriptedOperator {
    /// Events sorted by tick; `cursor` never moves backwards.
    events: Vec<ScriptedEvent>,
    cursor: usize,
    tick: u64,
}

impl ScriptedOperator {
    /// Parse a scenario tape from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, HalError> {
        let file: ScenarioFile = toml::from_str(raw)?;
        let mut events = file.event;
        events.sort_by_key(|e| e.tick);
        debug!(events = events.len(), "scenario tape loaded");
        Ok(Self {
            events,
            cursor: 0,
            tick: 0,
        })
    }

    /// Load a scenario tape from disk.
    pub fn load(path: &Path) -> Result<Self, HalError> {
        let raw = std::fs::read_to_string(path).map_err(|source| HalError::ScenarioRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Ticks with at least one scripted event remaining.
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }
}

impl InputSource for ScriptedOperator {
    fn poll(&mut self) -> RawInputs {
        let mut raw = RawInputs::default();
        while let Some(event) = self.events.get(self.cursor) {
            if event.tick != self.tick {
                break;
            }
            // Multiple rows on one tick accumulate detents and OR levels.
            raw.rotary_delta += event.rotary_delta;
            raw.mode_button_down |= event.mode_button;
            raw.esd_button_down |= event.esd_button;
            self.cursor += 1;
        }
        self.tick += 1;
        raw
    }
}
