//! facade.rs
//! Typed senders over the two inter-task queues.
//!
//! Each sender stamps the outgoing message with the current time from the
//! monotonic clock and performs one blocking post per logical event — no
//! batching, no coalescing. Timestamps are assigned at post time, so
//! timestamp order matches delivery order.

use std::sync::Arc;

use crate::clock::Clock;
use crate::messaging::channel::{PostError, QueuePoster};
use crate::messaging::message::Message;
use crate::trace::{EventRecorder, TraceEvent};

/// Sets the message timestamp from the clock's tick counter via the fixed
/// tick-to-millisecond ratio.
pub fn stamp(clock: &dyn Clock, message: &mut Message) {
    message.timestamp_ms = clock.now_ms();
}

/// Sensor → control sender for validated throttle inputs.
pub struct ControlInputSender {
    clock: Arc<dyn Clock>,
    queue: QueuePoster<Message>,
    recorder: Arc<EventRecorder>,
}

impl ControlInputSender {
    pub fn new(
        clock: Arc<dyn Clock>,
        queue: QueuePoster<Message>,
        recorder: Arc<EventRecorder>,
    ) -> Self {
        Self {
            clock,
            queue,
            recorder,
        }
    }

    /// Builds a `ControlInput` message, stamps it, and posts it. Blocks
    /// while the queue is full.
    pub fn send_control_input(&self, input: u32) -> Result<(), PostError> {
        let mut message = Message::control_input(input);
        stamp(self.clock.as_ref(), &mut message);
        self.recorder
            .record(message.timestamp_ms, TraceEvent::ThrottleInput { value: input });
        self.queue.post(message)?;
        self.recorder.record(
            message.timestamp_ms,
            TraceEvent::MessagePosted {
                queue: "control_input",
            },
        );
        Ok(())
    }

    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}

/// Control → downstream sender for torque requests.
pub struct TorqueRequestSender {
    clock: Arc<dyn Clock>,
    queue: QueuePoster<Message>,
    recorder: Arc<EventRecorder>,
}

impl TorqueRequestSender {
    pub fn new(
        clock: Arc<dyn Clock>,
        queue: QueuePoster<Message>,
        recorder: Arc<EventRecorder>,
    ) -> Self {
        Self {
            clock,
            queue,
            recorder,
        }
    }

    /// Builds a `TorqueRequest` message, stamps it, and posts it. Blocks
    /// while the queue is full.
    pub fn send_torque_request(&self, value: u32) -> Result<(), PostError> {
        let mut message = Message::torque_request(value);
        stamp(self.clock.as_ref(), &mut message);
        self.queue.post(message)?;
        self.recorder.record(
            message.timestamp_ms,
            TraceEvent::MessagePosted {
                queue: "torque_request",
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::messaging::channel;
    use crate::messaging::message::Payload;

    #[test]
    fn stamp_uses_current_clock_millis() {
        let clock = ManualClock::new();
        clock.set_ms(1234);
        let mut message = Message::control_input(42);
        stamp(&clock, &mut message);
        assert_eq!(message.timestamp_ms, 1234);
    }

    #[test]
    fn control_input_is_stamped_and_delivered_in_order() {
        let clock = Arc::new(ManualClock::new());
        let recorder = Arc::new(EventRecorder::new());
        let (tx, rx) = channel::create(8).unwrap();
        let sender = ControlInputSender::new(clock.clone(), tx, recorder);

        clock.set_ms(10);
        sender.send_control_input(100).unwrap();
        clock.set_ms(20);
        sender.send_control_input(200).unwrap();

        let first = rx.receive().unwrap();
        let second = rx.receive().unwrap();
        assert_eq!(first.timestamp_ms, 10);
        assert_eq!(first.payload, Payload::ControlInput { input: 100 });
        assert_eq!(second.timestamp_ms, 20);
        assert_eq!(second.payload, Payload::ControlInput { input: 200 });
        assert!(second.timestamp_ms >= first.timestamp_ms);
    }

    #[test]
    fn torque_request_carries_its_own_payload_kind() {
        let clock = Arc::new(ManualClock::new());
        let recorder = Arc::new(EventRecorder::new());
        let (tx, rx) = channel::create(4).unwrap();
        let sender = TorqueRequestSender::new(clock.clone(), tx, recorder);

        clock.set_ms(5);
        sender.send_torque_request(77).unwrap();
        let message = rx.receive().unwrap();
        assert_eq!(message.payload, Payload::TorqueRequest { value: 77 });
        assert_eq!(message.timestamp_ms, 5);
    }
}
