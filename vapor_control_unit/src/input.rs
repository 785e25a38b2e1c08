//! Operator input conditioning.
//!
//! Raw capability state (accumulated rotary detents plus two button
//! levels) arrives once per tick through [`InputSource::poll`]. The
//! sampler turns the levels into debounced edges on the tick grid: a
//! press counts only after the level has been stable-low for the
//! configured window, fires exactly once, and re-arms on release.
//!
//! [`InputSource::poll`]: vapor_common::io::InputSource::poll

use vapor_common::io::RawInputs;

/// Tick-aligned operator events produced by [`InputSampler::sample`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampledEvents {
    /// Net rotary movement since the previous tick [detents].
    pub setpoint_detents: i32,
    /// Debounced mode-toggle press edge.
    pub mode_toggle: bool,
    /// Debounced ESD press edge (trigger or reset depending on phase).
    pub esd_edge: bool,
}

// ─── Debounce ───────────────────────────────────────────────────────

/// Stable-low debounce for one button level.
#[derive(Debug, Clone, Copy, Default)]
struct DebouncedButton {
    stable_ticks: u32,
    emitted: bool,
}

impl DebouncedButton {
    /// Feed one tick's level; returns `true` on the debounced press edge.
    fn update(&mut self, pressed: bool, threshold: u32) -> bool {
        if !pressed {
            self.stable_ticks = 0;
            self.emitted = false;
            return false;
        }
        self.stable_ticks = self.stable_ticks.saturating_add(1);
        if self.stable_ticks >= threshold && !self.emitted {
            self.emitted = true;
            return true;
        }
        false
    }
}

// ─── Sampler ────────────────────────────────────────────────────────

/// Debounces button levels into edges and passes rotary detents through.
#[derive(Debug)]
pub struct InputSampler {
    debounce_ticks: u32,
    mode_button: DebouncedButton,
    esd_button: DebouncedButton,
}

impl InputSampler {
    /// `debounce_ticks` is the stable-low window in whole ticks (>= 1).
    pub fn new(debounce_ticks: u32) -> Self {
        Self {
            debounce_ticks: debounce_ticks.max(1),
            mode_button: DebouncedButton::default(),
            esd_button: DebouncedButton::default(),
        }
    }

    /// Consume one tick's latched raw inputs.
    pub fn sample(&mut self, raw: RawInputs) -> SampledEvents {
        SampledEvents {
            setpoint_detents: raw.rotary_delta,
            mode_toggle: self.mode_button.update(raw.mode_button_down, self.debounce_ticks),
            esd_edge: self.esd_button.update(raw.esd_button_down, self.debounce_ticks),
        }
    }
}
