//! Inter-task messaging: bounded blocking queues, message types, and the
//! timestamping facade between the sensor task and the control task.

pub mod channel;
pub mod facade;
pub mod message;
