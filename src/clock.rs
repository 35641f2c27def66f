//! clock.rs
//! Monotonic tick counter convertible to milliseconds.
//!
//! Timestamps are `u32` milliseconds derived from a tick counter through a
//! fixed tick-to-millisecond ratio. The counter wraps after ~49.7 days at
//! 1 ms resolution; all arithmetic on it is wrapping.

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Instant,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("clock tick rate must be non-zero")]
    ZeroTickRate,
    #[error("clock tick rate {0} Hz does not divide 1000 ms evenly")]
    UnevenTickRate(u32),
}

/// Monotonic time source shared by the messaging facade and the replay
/// engine. Implementations must be monotonic up to counter wraparound.
pub trait Clock: Send + Sync {
    /// Ticks elapsed since an implementation-defined epoch.
    fn now_ticks(&self) -> u32;

    /// Fixed tick-to-millisecond ratio.
    fn millis_per_tick(&self) -> u32;

    /// Current time in milliseconds, wrapping at the counter's period.
    fn now_ms(&self) -> u32 {
        self.now_ticks().wrapping_mul(self.millis_per_tick())
    }
}

/// Wall-clock backed tick counter with process start as the epoch.
pub struct SystemClock {
    start: Instant,
    millis_per_tick: u32,
}

impl SystemClock {
    /// The tick rate must divide one second evenly so the tick→ms ratio
    /// stays an integer.
    pub fn new(tick_rate_hz: u32) -> Result<Self, ClockError> {
        if tick_rate_hz == 0 {
            return Err(ClockError::ZeroTickRate);
        }
        if 1000 % tick_rate_hz != 0 {
            return Err(ClockError::UnevenTickRate(tick_rate_hz));
        }
        Ok(Self {
            start: Instant::now(),
            millis_per_tick: 1000 / tick_rate_hz,
        })
    }
}

impl Clock for SystemClock {
    fn now_ticks(&self) -> u32 {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        (elapsed_ms / self.millis_per_tick as u64) as u32
    }

    fn millis_per_tick(&self) -> u32 {
        self.millis_per_tick
    }
}

/// Externally stepped clock for deterministic tests. One millisecond per
/// tick; shared freely across threads.
#[derive(Default)]
pub struct ManualClock {
    ticks: AtomicU32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, ms: u32) {
        self.ticks.store(ms, Ordering::Release);
    }

    pub fn advance_ms(&self, ms: u32) {
        // wrapping add keeps the overflow behavior of the real counter
        let _ = self
            .ticks
            .fetch_update(Ordering::Release, Ordering::Acquire, |t| {
                Some(t.wrapping_add(ms))
            });
    }
}

impl Clock for ManualClock {
    fn now_ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    fn millis_per_tick(&self) -> u32 {
        1
    }
}
