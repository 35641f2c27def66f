//! sensor_task.rs
//! Periodic sensor task: read the throttle source, post a `ControlInput`
//! message, arm the wake source for one shot, suspend until woken.
//!
//! The loop is self-re-arming rather than free-running: the task cedes
//! execution between samples and a spin-sleep wake source resumes it at
//! the next deadline. Late wake-ups are counted as deadline misses.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use log::debug;
use spin_sleep::{SpinSleeper, SpinStrategy};
use thiserror::Error;

use crate::messaging::channel::PostError;
use crate::messaging::facade::ControlInputSender;
use crate::throttle::source::ThrottleSource;
use crate::trace::{EventRecorder, SharedDiagnostics, TraceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WakeError {
    #[error("sensor tick rate must be non-zero")]
    ZeroTickRate,
}

/// External fault-state collaborator, polled once per iteration.
pub trait FaultMonitor: Send {
    fn poll(&mut self);
}

/// One-shot wake source re-armed every iteration. Creation failure is
/// fatal: the task loop must not begin without it.
pub struct PeriodicWake {
    sleeper: SpinSleeper,
    period: Duration,
    next_deadline: Instant,
}

impl PeriodicWake {
    pub fn create(tick_rate_hz: u32) -> Result<Self, WakeError> {
        if tick_rate_hz == 0 {
            return Err(WakeError::ZeroTickRate);
        }
        Ok(Self {
            sleeper: SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread),
            period: Duration::from_nanos(1_000_000_000 / tick_rate_hz as u64),
            next_deadline: Instant::now(),
        })
    }

    /// Arms the wake source for one shot at the next period boundary.
    pub fn arm(&mut self) {
        self.next_deadline += self.period;
    }

    /// Suspends until the armed deadline. Returns false when the task
    /// resumed late (the deadline had already passed).
    pub fn wait(&mut self) -> bool {
        let now = Instant::now();
        if now < self.next_deadline {
            self.sleeper.sleep(self.next_deadline - now);
            true
        } else {
            false
        }
    }
}

/// Tick-scheduled driver of the throttle source.
pub struct SensorTask<S: ThrottleSource> {
    source: S,
    sender: ControlInputSender,
    wake: PeriodicWake,
    running: Arc<AtomicBool>,
    fault_monitor: Option<Box<dyn FaultMonitor>>,
    recorder: Arc<EventRecorder>,
    diagnostics: Arc<SharedDiagnostics>,
}

impl<S: ThrottleSource> SensorTask<S> {
    /// Creates the task and its periodic wake source. A wake-source
    /// failure here is fatal; the loop never starts partially.
    pub fn new(
        tick_rate_hz: u32,
        source: S,
        sender: ControlInputSender,
        running: Arc<AtomicBool>,
        fault_monitor: Option<Box<dyn FaultMonitor>>,
        recorder: Arc<EventRecorder>,
        diagnostics: Arc<SharedDiagnostics>,
    ) -> Result<Self, WakeError> {
        Ok(Self {
            source,
            sender,
            wake: PeriodicWake::create(tick_rate_hz)?,
            running,
            fault_monitor,
            recorder,
            diagnostics,
        })
    }

    /// Main sensor loop. Exits when the running flag clears or the
    /// consumer side of the queue disconnects.
    pub fn run(&mut self) {
        while self.running.load(Ordering::Acquire) {
            if let Some(monitor) = self.fault_monitor.as_mut() {
                monitor.poll();
            }

            let throttle = self.source.next_throttle();

            match self.sender.send_control_input(throttle) {
                Ok(()) => self.diagnostics.record_sample(),
                Err(PostError::Disconnected) => {
                    debug!("[sensor-task] control queue disconnected; exiting");
                    break;
                }
                Err(e) => {
                    debug!("[sensor-task] post failed: {}", e);
                    break;
                }
            }

            self.wake.arm();
            if !self.wake.wait() {
                // resumed after the scheduled tick (scheduling jitter)
                self.diagnostics.record_deadline_miss();
                self.recorder
                    .record(self.sender.now_ms(), TraceEvent::DeadlineMiss);
            }
        }

        debug!("[sensor-task] stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::messaging::channel;
    use crate::messaging::message::{Message, Payload};
    use std::sync::atomic::AtomicU32;
    use std::thread;

    struct FixedSource(u32);

    impl ThrottleSource for FixedSource {
        fn next_throttle(&mut self) -> u32 {
            self.0
        }
    }

    struct CountingMonitor(Arc<AtomicU32>);

    impl FaultMonitor for CountingMonitor {
        fn poll(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn zero_tick_rate_is_fatal_at_creation() {
        assert_eq!(
            PeriodicWake::create(0).err(),
            Some(WakeError::ZeroTickRate)
        );
    }

    #[test]
    fn loop_posts_one_message_per_tick_and_polls_faults() {
        let clock = Arc::new(ManualClock::new());
        let recorder = Arc::new(EventRecorder::new());
        let diagnostics = Arc::new(SharedDiagnostics::default());
        let (tx, rx) = channel::create::<Message>(64).unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let polls = Arc::new(AtomicU32::new(0));

        let mut task = SensorTask::new(
            1000, // 1 ms period keeps the test fast
            FixedSource(154),
            ControlInputSender::new(clock.clone(), tx, recorder.clone()),
            running.clone(),
            Some(Box::new(CountingMonitor(polls.clone()))),
            recorder,
            diagnostics.clone(),
        )
        .unwrap();

        let handle = thread::spawn(move || task.run());

        for _ in 0..5 {
            let message = rx.receive().unwrap();
            assert_eq!(message.payload, Payload::ControlInput { input: 154 });
        }
        running.store(false, Ordering::Release);
        drop(rx);
        handle.join().unwrap();

        assert!(diagnostics.snapshot().samples >= 5);
        assert!(polls.load(Ordering::Relaxed) >= 5);
    }

    #[test]
    fn loop_exits_when_consumer_disconnects() {
        let clock = Arc::new(ManualClock::new());
        let recorder = Arc::new(EventRecorder::new());
        let diagnostics = Arc::new(SharedDiagnostics::default());
        let (tx, rx) = channel::create::<Message>(1).unwrap();
        let running = Arc::new(AtomicBool::new(true));

        let mut task = SensorTask::new(
            1000,
            FixedSource(7),
            ControlInputSender::new(clock, tx, recorder.clone()),
            running,
            None,
            recorder,
            diagnostics,
        )
        .unwrap();

        drop(rx);
        // returns instead of blocking forever on the dead queue
        task.run();
    }
}
