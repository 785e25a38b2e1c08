//! Control engine root.
//!
//! Proportional setpoint tracking and per-mode output assembly.

pub mod output;
pub mod tracking;
