//! Safety module root.
//!
//! Emergency shutdown sequencing and the per-tick dump directive.

pub mod esd;
