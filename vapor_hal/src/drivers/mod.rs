//! Endpoint driver implementations, grouped by family.
//!
//! - [`simulation`] - software plant and scripted operator input for
//!   development runs and scenario replay
//! - [`host`] - host-side telemetry and actuator endpoints (serial
//!   device or stdout, UDP feed uplink, tracing sinks)
//!
//! # Adding New Drivers
//!
//! 1. Create a submodule under the matching family (or a new family).
//! 2. Implement the relevant port trait from `vapor_common::io`.
//! 3. Re-export the driver from the family module and from the crate
//!    root.

pub mod host;
pub mod simulation;
