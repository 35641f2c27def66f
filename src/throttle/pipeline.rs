//! pipeline.rs
//! Throttle safety pipeline: two redundant pedal sensors in, one
//! validated throttle value out.
//!
//! Each cycle reads both ADC channels, scales the readings down to the
//! output resolution, cross-checks them, averages, and applies the
//! deadzone. The discrepancy and deadzone cutoffs are safety outcomes,
//! not errors: the caller sees a zero value and no error signal.

use std::sync::Arc;

use log::warn;
use thiserror::Error;

use crate::config::ThrottleConfig;
use crate::throttle::source::ThrottleSource;
use crate::trace::SharedDiagnostics;

/// The two independent pedal channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    Throttle1,
    Throttle2,
}

impl AdcChannel {
    pub fn index(self) -> u8 {
        match self {
            AdcChannel::Throttle1 => 1,
            AdcChannel::Throttle2 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("adc conversion did not complete on channel {0}")]
pub struct AcquisitionError(pub u8);

/// Acquisition collaborator: a blocking raw read of one channel.
pub trait AdcReader: Send {
    fn acquire(&mut self, channel: AdcChannel) -> Result<u16, AcquisitionError>;
}

/// Dual-sensor scaling and validation pipeline.
pub struct ThrottlePipeline<A: AdcReader> {
    adc: A,
    scale_shift: u32,
    deadzone: u32,
    max_diff: u32,
    diff_check_enabled: bool,
    deadzone_enabled: bool,
    diagnostics: Arc<SharedDiagnostics>,
}

impl<A: AdcReader> ThrottlePipeline<A> {
    pub fn new(adc: A, config: &ThrottleConfig, diagnostics: Arc<SharedDiagnostics>) -> Self {
        Self {
            adc,
            scale_shift: config.scale_shift(),
            deadzone: config.deadzone_threshold(),
            max_diff: config.max_diff_threshold(),
            diff_check_enabled: config.diff_check_enabled,
            deadzone_enabled: config.deadzone_enabled,
            diagnostics,
        }
    }

    /// Reads both channels and returns the validated throttle value.
    ///
    /// A reading above the allowed cross-sensor discrepancy or an average
    /// inside the deadzone cuts the throttle to zero.
    pub fn read(&mut self) -> u32 {
        let reading_1 = (self.acquire_or_zero(AdcChannel::Throttle1) as u32) >> self.scale_shift;
        let reading_2 = (self.acquire_or_zero(AdcChannel::Throttle2) as u32) >> self.scale_shift;

        if self.diff_check_enabled && reading_1.abs_diff(reading_2) > self.max_diff {
            // maximum allowable discrepancy exceeded: fail-safe cutoff
            return 0;
        }

        // right shift 1 is the integer divide-by-2, rounding toward zero
        let average = (reading_1 + reading_2) >> 1;

        if self.deadzone_enabled && average < self.deadzone {
            return 0;
        }

        average
    }

    /// An acquisition failure is absorbed as a zero reading for this
    /// cycle so the control loop stays live; it is logged and counted so
    /// a supervisor can tell it apart from a legitimate zero.
    fn acquire_or_zero(&mut self, channel: AdcChannel) -> u16 {
        match self.adc.acquire(channel) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("throttle channel {} read failed: {}", channel.index(), e);
                self.diagnostics.record_acquisition_fault();
                0
            }
        }
    }
}

impl<A: AdcReader> ThrottleSource for ThrottlePipeline<A> {
    fn next_throttle(&mut self) -> u32 {
        self.read()
    }
}
