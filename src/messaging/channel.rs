//! channel.rs
//! Bounded blocking FIFO channel between one producer and one consumer.
//!
//! `post` blocks while the queue is full and `receive` blocks while it is
//! empty, both with no timeout; full/empty are never surfaced as errors.
//! A bounded-wait variant exists as an additive, non-default API for
//! callers that cannot afford the unbounded block.
//!
//! The handles are deliberately not `Clone`: single producer / single
//! consumer per queue is enforced by construction.

use std::time::Duration;

use crossbeam::channel::{
    bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("queue capacity must be non-zero")]
    ZeroCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PostError {
    #[error("receiver side of the queue disconnected")]
    Disconnected,
    #[error("post deadline elapsed before a slot freed")]
    DeadlineElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReceiveError {
    #[error("producer side of the queue disconnected")]
    Disconnected,
    #[error("receive deadline elapsed before a message arrived")]
    DeadlineElapsed,
}

/// Producer handle for a bounded queue.
pub struct QueuePoster<T> {
    tx: Sender<T>,
}

/// Consumer handle for a bounded queue.
pub struct QueueReceiver<T> {
    rx: Receiver<T>,
}

/// Creates a bounded queue holding at most `capacity` undelivered
/// messages. Creation failure is fatal to system bring-up and must be
/// propagated by the caller, never ignored.
pub fn create<T>(capacity: usize) -> Result<(QueuePoster<T>, QueueReceiver<T>), ChannelError> {
    if capacity == 0 {
        return Err(ChannelError::ZeroCapacity);
    }
    let (tx, rx) = bounded(capacity);
    Ok((QueuePoster { tx }, QueueReceiver { rx }))
}

impl<T> QueuePoster<T> {
    /// Blocking post: suspends the calling task until a slot is free.
    pub fn post(&self, message: T) -> Result<(), PostError> {
        self.tx.send(message).map_err(|_| PostError::Disconnected)
    }

    /// Bounded-wait post. Additive API; default semantics stay unbounded.
    pub fn post_deadline(&self, message: T, wait: Duration) -> Result<(), PostError> {
        self.tx.send_timeout(message, wait).map_err(|e| match e {
            SendTimeoutError::Timeout(_) => PostError::DeadlineElapsed,
            SendTimeoutError::Disconnected(_) => PostError::Disconnected,
        })
    }

    /// Number of undelivered messages currently queued.
    pub fn queued(&self) -> usize {
        self.tx.len()
    }
}

impl<T> QueueReceiver<T> {
    /// Blocking receive: suspends the calling task until a message is
    /// available.
    pub fn receive(&self) -> Result<T, ReceiveError> {
        self.rx.recv().map_err(|_| ReceiveError::Disconnected)
    }

    /// Bounded-wait receive. Additive API; default semantics stay
    /// unbounded.
    pub fn receive_deadline(&self, wait: Duration) -> Result<T, ReceiveError> {
        self.rx.recv_timeout(wait).map_err(|e| match e {
            RecvTimeoutError::Timeout => ReceiveError::DeadlineElapsed,
            RecvTimeoutError::Disconnected => ReceiveError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn zero_capacity_is_a_creation_error() {
        assert_eq!(create::<u32>(0).err(), Some(ChannelError::ZeroCapacity));
    }

    #[test]
    fn preserves_fifo_order() {
        let (tx, rx) = create(8).unwrap();
        for v in 0..8u32 {
            tx.post(v).unwrap();
        }
        for v in 0..8u32 {
            assert_eq!(rx.receive().unwrap(), v);
        }
    }

    #[test]
    fn full_queue_blocks_poster_until_drained() {
        let (tx, rx) = create(1).unwrap();
        tx.post(1u32).unwrap();

        let poster = thread::spawn(move || {
            // blocks until the receiver drains the first message
            tx.post(2u32).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(rx.receive().unwrap(), 1);
        assert_eq!(rx.receive().unwrap(), 2);
        poster.join().unwrap();
    }

    #[test]
    fn empty_queue_blocks_receiver_until_posted() {
        let (tx, rx) = create::<u32>(4).unwrap();

        let receiver = thread::spawn(move || rx.receive().unwrap());
        thread::sleep(Duration::from_millis(50));
        tx.post(7).unwrap();
        assert_eq!(receiver.join().unwrap(), 7);
    }

    #[test]
    fn deadline_variants_time_out_instead_of_blocking() {
        let (tx, rx) = create::<u32>(1).unwrap();
        assert_eq!(
            rx.receive_deadline(Duration::from_millis(10)).err(),
            Some(ReceiveError::DeadlineElapsed)
        );
        tx.post(1).unwrap();
        assert_eq!(
            tx.post_deadline(2, Duration::from_millis(10)).err(),
            Some(PostError::DeadlineElapsed)
        );
    }

    #[test]
    fn disconnect_is_reported_to_the_caller() {
        let (tx, rx) = create::<u32>(1).unwrap();
        drop(rx);
        assert_eq!(tx.post(1).err(), Some(PostError::Disconnected));

        let (tx, rx) = create::<u32>(1).unwrap();
        drop(tx);
        assert_eq!(rx.receive().err(), Some(ReceiveError::Disconnected));
    }
}
