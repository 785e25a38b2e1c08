//! Flow-band classification.
//!
//! Two named process corridors, re-derived every tick from the raw
//! values and the system mode. Flow is only meaningful under normal
//! regulation; every special mode forces `None` regardless of values.
//!
//! | Band | Pressure [kPa] | Temperature [°C] | LED pattern |
//! |------|----------------|------------------|-------------|
//! | A    | 310..=350      | 140..=160        | blink fast  |
//! | B    | 260..=300      | 160..=170        | solid       |

use vapor_common::prelude::*;

/// Classify the current tick's flow band.
pub fn classify(mode: SystemMode, measurements: &Measurements) -> FlowState {
    if !mode.allows_flow() {
        return FlowState::None;
    }
    let (Some(p), Some(t)) = (measurements.pressure_kpa, measurements.temperature_c) else {
        return FlowState::None;
    };
    if (310.0..=350.0).contains(&p) && (140.0..=160.0).contains(&t) {
        FlowState::A
    } else if (260.0..=300.0).contains(&p) && (160.0..=170.0).contains(&t) {
        FlowState::B
    } else {
        FlowState::None
    }
}

/// Indicator pattern associated with a flow band.
pub const fn pattern_for(flow: FlowState) -> IndicatorPattern {
    match flow {
        FlowState::A => IndicatorPattern::BlinkFast,
        FlowState::B | FlowState::None => IndicatorPattern::Solid,
    }
}
