//! message.rs
//! Message types carried over the inter-task queues.
//!
//! One tagged payload type covers both queues: the sensor task posts
//! `ControlInput` to the control task, which posts `TorqueRequest`
//! downstream. Messages are stamped at post time and immutable after.

use serde::Serialize;

/// Payload variants for the two queue roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Payload {
    /// Validated throttle input, sensor → control.
    ControlInput { input: u32 },
    /// Torque demand, control → downstream.
    TorqueRequest { value: u32 },
}

/// A timestamped message. `timestamp_ms` wraps at the clock's overflow
/// period (~49.7 days); consecutive messages from one producer are
/// non-decreasing modulo that wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Message {
    pub timestamp_ms: u32,
    pub payload: Payload,
}

impl Message {
    pub fn control_input(input: u32) -> Self {
        Self {
            timestamp_ms: 0,
            payload: Payload::ControlInput { input },
        }
    }

    pub fn torque_request(value: u32) -> Self {
        Self {
            timestamp_ms: 0,
            payload: Payload::TorqueRequest { value },
        }
    }
}
