//! Host driver family.
//!
//! Telemetry and actuator endpoints for a development host: the serial
//! record sink (device or stdout), the UDP feed uplink, and tracing
//! sinks that stand in for the rig's PWM outputs and RGB beacon.

mod console;
mod serial;
mod uplink;

pub use console::{TracingActuator, TracingIndicator};
pub use serial::SerialLineSink;
pub use uplink::UdpFeedPublisher;
