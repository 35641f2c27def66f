//! Throttle acquisition: the dual-sensor safety pipeline for live running
//! and the table-driven replay engine for deterministic bench testing.

pub mod pipeline;
pub mod replay;
pub mod source;
pub mod tables;
