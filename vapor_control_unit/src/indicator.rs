//! Status beacon resolution.
//!
//! A single RGB beacon summarises the rig state. One colour ladder,
//! highest priority first:
//!
//! | Condition                        | Colour | Pattern    |
//! |----------------------------------|--------|------------|
//! | ESD active                       | red    | solid      |
//! | ESD recovering                   | red    | blink slow |
//! | Any channel at emergency         | red    | solid      |
//! | Any channel in warning           | amber  | solid      |
//! | Mode-toggle animation            | accent | solid      |
//! | Recovery / Preheat               | cyan   | solid      |
//! | Flow corridor A                  | green  | blink fast |
//! | Flow corridor B                  | green  | solid      |
//! | Otherwise                        | green  | solid      |
//!
//! `Esd(ReadyForReset)` deliberately falls through the ESD rows so the
//! beacon can report the plant as healthy while the press waits.
//!
//! The toggle animation runs for a fixed number of ticks, alternating
//! the new mode's accent colour with green. Safety rows above it still
//! win the beacon, but the animation keeps aging underneath so it can
//! never wedge the display.

use vapor_common::io::{IndicatorCommand, IndicatorPattern, Rgb};
use vapor_common::state::{EsdPhase, FlowState, OperatingMode, SystemMode};

use crate::state::safety::SafetyAssessment;

// ─── Palette ─────────────────────────────────────────────────────────────

/// Healthy / corridor colour.
pub const GREEN: Rgb = Rgb::new(0, 160, 0);
/// Emergency and ESD colour.
pub const RED: Rgb = Rgb::new(200, 0, 0);
/// Warning colour.
pub const AMBER: Rgb = Rgb::new(200, 140, 0);
/// Recovery / Preheat colour.
pub const CYAN: Rgb = Rgb::new(0, 255, 255);
/// Pressure-mode accent.
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
/// Temperature-mode accent.
pub const BLUE: Rgb = Rgb::new(0, 120, 200);

/// Length of the mode-toggle animation, in ticks.
pub const TOGGLE_ANIMATION_TICKS: u8 = 4;

// ─── Blink resolution ────────────────────────────────────────────────────

/// Resolve a pattern to an on/off level at a given tick.
///
/// Slow blink toggles every 5 ticks, fast blink every 2; at the default
/// 100 ms period that is 1 Hz and 2.5 Hz.
#[inline]
pub const fn blink_phase(pattern: IndicatorPattern, tick: u64) -> bool {
    match pattern {
        IndicatorPattern::Solid => true,
        IndicatorPattern::BlinkSlow => (tick / 5) % 2 == 0,
        IndicatorPattern::BlinkFast => (tick / 2) % 2 == 0,
    }
}

// ─── Driver ──────────────────────────────────────────────────────────────

/// Resolves the beacon command once per tick and owns the toggle
/// animation countdown.
#[derive(Debug)]
pub struct IndicatorDriver {
    animation_left: u8,
    animation_accent: Rgb,
}

impl IndicatorDriver {
    pub const fn new() -> Self {
        Self {
            animation_left: 0,
            animation_accent: WHITE,
        }
    }

    /// Arm the toggle animation for the mode just switched to.
    pub fn start_toggle_animation(&mut self, mode: OperatingMode) {
        self.animation_left = TOGGLE_ANIMATION_TICKS;
        self.animation_accent = match mode {
            OperatingMode::Pressure => WHITE,
            OperatingMode::Temperature => BLUE,
        };
    }

    /// Walk the colour ladder for this tick.
    pub fn render(
        &mut self,
        mode: SystemMode,
        assessment: &SafetyAssessment,
        flow: FlowState,
    ) -> IndicatorCommand {
        // Age the animation on every render, shown or not.
        let animation_frame = self.animation_left;
        if animation_frame > 0 {
            self.animation_left -= 1;
        }

        match mode {
            SystemMode::Esd(EsdPhase::Active) => return IndicatorCommand::solid(RED),
            SystemMode::Esd(EsdPhase::Recovering) => {
                return IndicatorCommand {
                    color: RED,
                    pattern: IndicatorPattern::BlinkSlow,
                };
            }
            // ReadyForReset reports through the ordinary ladder below.
            _ => {}
        }

        if assessment.any_emergency() {
            return IndicatorCommand::solid(RED);
        }
        if assessment.any_warning() {
            return IndicatorCommand::solid(AMBER);
        }

        if animation_frame > 0 {
            let color = if animation_frame % 2 == 0 {
                self.animation_accent
            } else {
                GREEN
            };
            return IndicatorCommand::solid(color);
        }

        if matches!(mode, SystemMode::Recovery | SystemMode::Preheat) {
            return IndicatorCommand::solid(CYAN);
        }

        match flow {
            FlowState::A => IndicatorCommand {
                color: GREEN,
                pattern: IndicatorPattern::BlinkFast,
            },
            FlowState::B | FlowState::None => IndicatorCommand::solid(GREEN),
        }
    }
}

impl Default for IndicatorDriver {
    fn default() -> Self {
        Self::new()
    }
}
