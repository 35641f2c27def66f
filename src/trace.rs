//! trace.rs
//! Event tracing and diagnostics for the sensor layer.
//!
//! Two independent paths:
//! - **EventRecorder:** lock-free bounded queue → background CSV export.
//!   Producers never block; events are dropped (and counted) when the
//!   queue is full.
//! - **SharedDiagnostics:** mutexed counters (samples, deadline misses,
//!   acquisition faults, lap completions) snapshot at shutdown.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_queue::ArrayQueue;
use log::error;
use parking_lot::Mutex;
use serde::Serialize;

const TRACE_CAPACITY: usize = 8192; // bounded; producers drop rather than block
const EXPORT_POLL_MS: u64 = 5;

/// Trace events emitted along the sensor → control path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Throttle value produced for this cycle (live or replay).
    ThrottleInput { value: u32 },
    /// Message accepted by a queue.
    MessagePosted { queue: &'static str },
    /// Sensor task woke up after its scheduled deadline.
    DeadlineMiss,
    /// An ADC channel read did not complete; absorbed as a zero reading.
    AcquisitionFault { channel: u8 },
}

#[derive(Debug, Clone, Copy)]
struct Stamped {
    seq: u64,
    ts_ms: u32,
    event: TraceEvent,
}

#[derive(Debug, Serialize)]
struct CsvRow {
    seq: u64,
    ts_ms: u32,
    event: &'static str,
    value: u64,
}

impl Stamped {
    fn to_row(self) -> CsvRow {
        let (event, value) = match self.event {
            TraceEvent::ThrottleInput { value } => ("throttle_input", value as u64),
            TraceEvent::MessagePosted { queue: "control_input" } => ("control_input_posted", 0),
            TraceEvent::MessagePosted { .. } => ("torque_request_posted", 0),
            TraceEvent::DeadlineMiss => ("deadline_miss", 0),
            TraceEvent::AcquisitionFault { channel } => ("acquisition_fault", channel as u64),
        };
        CsvRow {
            seq: self.seq,
            ts_ms: self.ts_ms,
            event,
            value,
        }
    }
}

/// Non-blocking event recorder with background CSV export.
pub struct EventRecorder {
    queue: Arc<ArrayQueue<Stamped>>,
    next_seq: AtomicU64,
    dropped: AtomicU64,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(TRACE_CAPACITY)),
            next_seq: AtomicU64::new(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends an event; drops it (counted) when the queue is full.
    #[inline]
    pub fn record(&self, ts_ms: u32, event: TraceEvent) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        if self.queue.push(Stamped { seq, ts_ms, event }).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Events dropped because the trace queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Spawns a thread draining the queue into a CSV file. Runs until
    /// `running` is cleared and the queue is empty.
    pub fn start_exporter(
        self: &Arc<Self>,
        output_csv: PathBuf,
        running: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        let queue = self.queue.clone();

        thread::spawn(move || {
            let mut writer = match csv::Writer::from_path(&output_csv) {
                Ok(w) => w,
                Err(e) => {
                    error!("failed to create trace CSV {:?}: {}", output_csv, e);
                    return;
                }
            };

            loop {
                match queue.pop() {
                    Some(stamped) => {
                        if let Err(e) = writer.serialize(stamped.to_row()) {
                            error!("trace CSV write failed: {}", e);
                            return;
                        }
                    }
                    None => {
                        if !running.load(Ordering::Acquire) && queue.is_empty() {
                            break;
                        }
                        thread::sleep(Duration::from_millis(EXPORT_POLL_MS));
                    }
                }
            }

            if let Err(e) = writer.flush() {
                error!("trace CSV flush failed: {}", e);
            }
        })
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the diagnostics counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub samples: u64,
    pub deadline_misses: u64,
    pub acquisition_faults: u64,
    pub laps_completed: u64,
}

/// Counters shared between the sensor task, the pipeline, and the replay
/// engine. Single mutex; every record is a short critical section.
#[derive(Default)]
pub struct SharedDiagnostics {
    inner: Mutex<Diagnostics>,
}

impl SharedDiagnostics {
    pub fn record_sample(&self) {
        self.inner.lock().samples += 1;
    }

    pub fn record_deadline_miss(&self) {
        self.inner.lock().deadline_misses += 1;
    }

    pub fn record_acquisition_fault(&self) {
        self.inner.lock().acquisition_faults += 1;
    }

    pub fn record_lap_completed(&self) {
        self.inner.lock().laps_completed += 1;
    }

    pub fn snapshot(&self) -> Diagnostics {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_drops_instead_of_blocking_when_full() {
        let recorder = EventRecorder::new();
        for _ in 0..(TRACE_CAPACITY + 10) {
            recorder.record(0, TraceEvent::DeadlineMiss);
        }
        assert_eq!(recorder.dropped(), 10);
    }

    #[test]
    fn diagnostics_counters_accumulate() {
        let diag = SharedDiagnostics::default();
        diag.record_sample();
        diag.record_sample();
        diag.record_deadline_miss();
        diag.record_acquisition_fault();
        diag.record_lap_completed();

        let snap = diag.snapshot();
        assert_eq!(snap.samples, 2);
        assert_eq!(snap.deadline_misses, 1);
        assert_eq!(snap.acquisition_faults, 1);
        assert_eq!(snap.laps_completed, 1);
    }

    #[test]
    fn exporter_writes_recorded_events() {
        let recorder = Arc::new(EventRecorder::new());
        recorder.record(10, TraceEvent::ThrottleInput { value: 154 });
        recorder.record(10, TraceEvent::MessagePosted { queue: "control_input" });

        let path = std::env::temp_dir().join("vcu_sensors_trace_test.csv");
        let running = Arc::new(AtomicBool::new(true));
        let handle = recorder.start_exporter(path.clone(), running.clone());
        std::thread::sleep(Duration::from_millis(50));
        running.store(false, Ordering::Release);
        handle.join().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("throttle_input"));
        assert!(contents.contains("control_input_posted"));
        let _ = std::fs::remove_file(path);
    }
}
