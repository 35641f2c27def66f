//! Demo harness for the VCU sensor layer.
//!
//! Wires the full path: sensor task → control-input queue → control task →
//! torque-request queue → downstream drain. The throttle source is chosen
//! from configuration: the replay engine over the recorded lap tables, or
//! the live pipeline against a simulated pedal. Trace events are exported
//! to CSV and a diagnostics summary is printed at shutdown.

use std::{
    error::Error,
    fs::create_dir_all,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use log::{debug, info};
use rand::random_range;

use vcu_sensors::clock::{Clock, SystemClock};
use vcu_sensors::config::{Config, ReplayMode};
use vcu_sensors::messaging::channel::{self, QueueReceiver};
use vcu_sensors::messaging::facade::{ControlInputSender, TorqueRequestSender};
use vcu_sensors::messaging::message::{Message, Payload};
use vcu_sensors::sensor_task::SensorTask;
use vcu_sensors::throttle::pipeline::{AcquisitionError, AdcChannel, AdcReader, ThrottlePipeline};
use vcu_sensors::throttle::replay::ReplayEngine;
use vcu_sensors::throttle::source::ThrottleSource;
use vcu_sensors::trace::{EventRecorder, SharedDiagnostics};

const RUN_SECS: u64 = 30;
const TRACE_CSV: &str = "data/trace.csv";

/// Noisy stand-in for the pedal ADC channels used in `ReplayMode::Live`
/// bench runs without hardware. Both channels track the same slow sweep
/// with independent noise.
struct SimulatedPedal {
    position: f32,
    rising: bool,
}

impl SimulatedPedal {
    fn new() -> Self {
        Self {
            position: 0.0,
            rising: true,
        }
    }
}

impl AdcReader for SimulatedPedal {
    fn acquire(&mut self, channel: AdcChannel) -> Result<u16, AcquisitionError> {
        if matches!(channel, AdcChannel::Throttle1) {
            // advance the sweep once per cycle, on the first channel
            let step = random_range(0.0..0.01f32);
            if self.rising {
                self.position += step;
                if self.position >= 1.0 {
                    self.position = 1.0;
                    self.rising = false;
                }
            } else {
                self.position -= step;
                if self.position <= 0.0 {
                    self.position = 0.0;
                    self.rising = true;
                }
            }
        }
        let noise = random_range(-120.0..120.0f32);
        let raw = (self.position * u16::MAX as f32 + noise).clamp(0.0, u16::MAX as f32);
        Ok(raw as u16)
    }
}

fn main() {
    env_logger::init();
    info!("=== VCU SENSOR LAYER START ===");

    if let Err(e) = run(Config::default()) {
        eprintln!("bring-up failed: {}", e);
        std::process::exit(1);
    }

    info!("=== VCU SENSOR LAYER FINISHED ===");
}

fn run(config: Config) -> Result<(), Box<dyn Error>> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.tick_rate_hz)?);
    let recorder = Arc::new(EventRecorder::new());
    let diagnostics = Arc::new(SharedDiagnostics::default());
    let running = Arc::new(AtomicBool::new(true));

    create_dir_all("data")?;
    let exporter = recorder.start_exporter(TRACE_CSV.into(), running.clone());

    // queue creation failures are fatal to bring-up; propagate, never ignore
    let (control_tx, control_rx) = channel::create::<Message>(config.queue_capacity)?;
    let (torque_tx, torque_rx) = channel::create::<Message>(config.queue_capacity)?;

    // sensor task: built fully before its thread starts so an init
    // failure prevents any partial operation
    let sender = ControlInputSender::new(clock.clone(), control_tx, recorder.clone());
    let source: Box<dyn ThrottleSource + Send> = match config.replay_mode {
        ReplayMode::Replay => Box::new(ReplayEngine::with_recorded_laps(
            clock.clone(),
            config.replay_total_laps,
            diagnostics.clone(),
        )?),
        ReplayMode::Live => Box::new(ThrottlePipeline::new(
            SimulatedPedal::new(),
            &config.throttle,
            diagnostics.clone(),
        )),
    };
    let mut sensor_task = SensorTask::new(
        config.tick_rate_hz,
        source,
        sender,
        running.clone(),
        None,
        recorder.clone(),
        diagnostics.clone(),
    )?;

    let sensor_handle = thread::spawn(move || sensor_task.run());

    // control task: drains validated throttle inputs and issues a
    // passthrough torque request downstream
    let control_handle = {
        let torque = TorqueRequestSender::new(clock.clone(), torque_tx, recorder.clone());
        thread::spawn(move || control_task(control_rx, torque))
    };

    let downstream_handle = thread::spawn(move || drain_downstream(torque_rx));

    info!("running for {} seconds...", RUN_SECS);
    thread::sleep(Duration::from_secs(RUN_SECS));
    running.store(false, Ordering::Release);

    // the sensor task drops its sender on exit; disconnection then
    // cascades through the control task to the downstream drain
    sensor_handle.join().expect("sensor task panicked");
    control_handle.join().expect("control task panicked");
    downstream_handle.join().expect("downstream drain panicked");
    exporter.join().expect("trace exporter panicked");

    let snapshot = diagnostics.snapshot();
    info!(
        "samples={} deadline_misses={} acquisition_faults={} laps_completed={} trace_dropped={}",
        snapshot.samples,
        snapshot.deadline_misses,
        snapshot.acquisition_faults,
        snapshot.laps_completed,
        recorder.dropped(),
    );
    info!("trace exported to {}", TRACE_CSV);

    Ok(())
}

fn control_task(control_rx: QueueReceiver<Message>, torque: TorqueRequestSender) {
    while let Ok(message) = control_rx.receive() {
        if let Payload::ControlInput { input } = message.payload {
            // torque arbitration lives downstream; this stage forwards
            // the validated input unchanged
            if torque.send_torque_request(input).is_err() {
                debug!("[control-task] torque queue disconnected; exiting");
                break;
            }
        }
    }
    debug!("[control-task] stopped");
}

fn drain_downstream(torque_rx: QueueReceiver<Message>) {
    while let Ok(message) = torque_rx.receive() {
        if let Payload::TorqueRequest { value } = message.payload {
            debug!(
                "[downstream] torque request value={} ts={}ms",
                value, message.timestamp_ms
            );
        }
    }
    debug!("[downstream] stopped");
}
