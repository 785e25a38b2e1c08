//! Simulation driver family.
//!
//! A deterministic software plant and operator input sources for
//! development and scenario replay without the physical rig.

mod operator;
mod plant;

pub use operator::{NullOperator, ScriptedOperator};
pub use plant::SimulatedPlant;
