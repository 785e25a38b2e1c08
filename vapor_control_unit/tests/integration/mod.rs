//! Scenario suites, one module per lifecycle family.

mod esd_sequence;
mod mode_ladder;
mod operator_input;
mod telemetry_feed;
mod tick_pipeline;
