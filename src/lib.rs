//! # VCU Sensor Acquisition & Messaging Layer
//!
//! Sensor-side core of a real-time vehicle control unit: reads redundant
//! throttle-pedal sensors, validates them against the safety policy,
//! timestamps the result, and hands it to the control task over a bounded
//! blocking queue. A table-driven replay engine substitutes for live
//! sensor hardware during bench testing, producing the same message
//! stream from pre-recorded lap data.
//!
//! ## Architecture
//! - **Messaging:** bounded FIFO queues with blocking post/receive plus a
//!   timestamping facade over the two queue roles (`ControlInput`,
//!   `TorqueRequest`).
//! - **Throttle pipeline:** dual-sensor scaling, cross-sensor discrepancy
//!   rejection, and deadzone suppression; cutoffs are silent fail-safe
//!   outcomes, never errors.
//! - **Replay engine:** deterministic lookup over standing-start and
//!   flying-lap tables with lap rollover.
//! - **Sensor task:** tick-scheduled, self-re-arming loop driving either
//!   source, selected once at startup.

pub mod clock;
pub mod config;
pub mod messaging;
pub mod sensor_task;
pub mod throttle;
pub mod trace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ReplayMode, ThrottleConfig};
pub use messaging::message::{Message, Payload};
