//! # Vapor Control Unit Library
//!
//! Deterministic control core for the simulated VaporSur steam rig.
//! Runs a fixed 100 ms tick that latches operator input, advances the
//! plant port, classifies both process variables against the safety
//! envelope, sequences emergency shutdown, resolves the system mode,
//! assembles actuator and discrete outputs, and emits telemetry on two
//! independent channels.
//!
//! ## Architecture Levels
//!
//! 1. **SystemMode** — top-level mode ladder (Normal / Recovery /
//!    Preheat / ESD)
//! 2. **EsdPhase** — emergency shutdown sub-state-machine
//! 3. **SafetyLevel** — per-variable threshold classification
//!
//! ## Single-Writer Tick
//!
//! All mutable control state lives inside the [`cycle::ControlLoop`];
//! the tick is the only context that mutates it. Ports to the plant and
//! the telemetry sinks are injected trait objects, so the whole tick
//! body runs against fakes in tests.

#![deny(clippy::disallowed_types)]

pub mod config;
pub mod control;
pub mod cycle;
pub mod flow;
pub mod indicator;
pub mod input;
pub mod safety;
pub mod state;
pub mod telemetry;
