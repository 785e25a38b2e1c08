//! # Vapor HAL
//!
//! Endpoint drivers for the vapor control unit: the simulated plant and
//! operator sources on one side, the host telemetry and actuator sinks
//! on the other. Everything implements the port traits from
//! `vapor_common::io`, so the control loop never knows which family it
//! is wired to.
//!
//! # Module Structure
//!
//! - [`drivers`] - endpoint driver implementations, by family
//! - [`error`] - driver setup errors
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     vapor_control_unit                      │
//! │                (ports from vapor_common::io)                │
//! └────┬─────────────┬──────────────┬──────────────┬────────────┘
//!      │             │              │              │
//! ProcessPlant  InputSource    SerialSink    FeedPublisher
//!      │             │              │              │
//! SimulatedPlant ScriptedOperator SerialLineSink UdpFeedPublisher
//!                NullOperator     (device or     (JSON datagrams)
//!                                  stdout)
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod drivers;
pub mod error;

// Re-export driver types for convenience
pub use crate::drivers::host::{
    SerialLineSink, TracingActuator, TracingIndicator, UdpFeedPublisher,
};
pub use crate::drivers::simulation::{NullOperator, ScriptedOperator, SimulatedPlant};
pub use crate::error::HalError;
