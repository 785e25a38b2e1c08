//! State machine module root.
//!
//! Per-variable safety classification and the top-level system mode
//! ladder.

pub mod machine;
pub mod safety;
