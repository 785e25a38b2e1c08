//! Log-backed actuator and indicator sinks.
//!
//! On a host without rig hardware the actuator image and the status
//! beacon go to the tracing subscriber instead of PWM and WS2812
//! channels. Both sinks latch the last value so supervising code (and
//! tests) can inspect what the loop commanded.

use tracing::{debug, trace};

use vapor_common::io::{ActuatorSink, IndicatorCommand, IndicatorSink};
use vapor_common::process::{ActuatorCommand, DiscreteOutputs};

/// Actuator sink that logs each applied image at `trace` level.
#[derive(Debug, Default)]
pub struct TracingActuator {
    last: Option<(ActuatorCommand, DiscreteOutputs)>,
}

impl TracingActuator {
    /// Last applied actuator image, if any tick ran yet.
    #[inline]
    pub const fn last(&self) -> Option<(ActuatorCommand, DiscreteOutputs)> {
        self.last
    }
}

impl ActuatorSink for TracingActuator {
    fn apply(&mut self, command: &ActuatorCommand, discrete: DiscreteOutputs) {
        trace!(
            valve_pct = command.valve_pct,
            heater_pct = command.heater_pct,
            discrete = ?discrete,
            "actuator image applied"
        );
        self.last = Some((*command, discrete));
    }
}

/// Indicator sink that logs color/pattern changes at `debug` level.
///
/// The beacon is commanded every tick but changes rarely; logging only
/// the edges keeps the output readable at `-v`.
#[derive(Debug, Default)]
pub struct TracingIndicator {
    last: Option<IndicatorCommand>,
}

impl TracingIndicator {
    /// Last commanded indicator state, if any tick ran yet.
    #[inline]
    pub const fn last(&self) -> Option<IndicatorCommand> {
        self.last
    }
}

impl IndicatorSink for TracingIndicator {
    fn set(&mut self, command: IndicatorCommand) {
        if self.last != Some(command) {
            debug!(
                r = command.color.r,
                g = command.color.g,
                b = command.color.b,
                pattern = ?command.pattern,
                "indicator changed"
            );
        }
        self.last = Some(command);
    }
}
