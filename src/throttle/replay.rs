//! replay.rs
//! Deterministic, table-driven substitute for the live throttle pipeline.
//!
//! Lap 0 replays the standing-start table; every later lap reuses the
//! flying-lap table. The lookup index only ever moves forward within a
//! lap; reaching the final entry completes the lap and resets the index
//! for the next call. Once the configured number of laps has finished,
//! every call returns zero.

use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;
use crate::throttle::source::ThrottleSource;
use crate::throttle::tables::LapPoint;
use crate::trace::SharedDiagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplayTableError {
    #[error("replay table needs at least two entries")]
    TooShort,
    #[error("replay table entries must be strictly ascending in elapsed time")]
    NotAscending,
}

/// Replay progress, derived from the lap counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    Replaying { lap: u32 },
    Finished,
}

/// Table-driven throttle source. Owned by the sensor task; single-writer
/// by construction, so the mutable state needs no lock.
pub struct ReplayEngine {
    clock: Arc<dyn Clock>,
    standing_start: &'static [LapPoint],
    flying_lap: &'static [LapPoint],
    total_laps: u32,
    lap_count: u32,
    lookup_index: usize,
    last_lap_finish_ms: u32,
    diagnostics: Arc<SharedDiagnostics>,
}

impl ReplayEngine {
    pub fn new(
        clock: Arc<dyn Clock>,
        standing_start: &'static [LapPoint],
        flying_lap: &'static [LapPoint],
        total_laps: u32,
        diagnostics: Arc<SharedDiagnostics>,
    ) -> Result<Self, ReplayTableError> {
        validate_table(standing_start)?;
        validate_table(flying_lap)?;
        Ok(Self {
            clock,
            standing_start,
            flying_lap,
            total_laps,
            lap_count: 0,
            lookup_index: 0,
            last_lap_finish_ms: 0,
            diagnostics,
        })
    }

    /// Engine over the compiled-in lap data.
    pub fn with_recorded_laps(
        clock: Arc<dyn Clock>,
        total_laps: u32,
        diagnostics: Arc<SharedDiagnostics>,
    ) -> Result<Self, ReplayTableError> {
        Self::new(
            clock,
            crate::throttle::tables::STANDING_START,
            crate::throttle::tables::FLYING_LAP,
            total_laps,
            diagnostics,
        )
    }

    pub fn phase(&self) -> ReplayPhase {
        if self.lap_count < self.total_laps {
            ReplayPhase::Replaying {
                lap: self.lap_count,
            }
        } else {
            ReplayPhase::Finished
        }
    }

    /// Simulated throttle input for the current system time.
    pub fn next(&mut self) -> u32 {
        if self.lap_count >= self.total_laps {
            return 0;
        }

        // standing-start data in the first lap, flying-lap data after
        let table = if self.lap_count == 0 {
            self.standing_start
        } else {
            self.flying_lap
        };
        let final_index = table.len() - 1;
        let lap_finish_ms = table[final_index].elapsed_ms;

        let current_time_ms = self.clock.now_ms();
        let current_lap_time = current_time_ms.wrapping_sub(self.last_lap_finish_ms);

        // advance to the entry for the current time slot; never backward
        let mut end_of_lap = false;
        while self.lookup_index < final_index {
            let next_time = table[self.lookup_index + 1].elapsed_ms;
            let at_final = self.lookup_index + 1 == final_index;

            if next_time < current_lap_time || (at_final && next_time == current_lap_time) {
                self.lookup_index += 1;
                if next_time == lap_finish_ms {
                    end_of_lap = true;
                    break;
                }
            } else {
                break;
            }
        }

        let throttle = table[self.lookup_index].throttle as u32;

        // reset takes effect on the next call; this call still outputs
        // the final entry of the lap just completed
        if end_of_lap {
            self.lookup_index = 0;
            self.lap_count += 1;
            self.last_lap_finish_ms = current_time_ms;
            self.diagnostics.record_lap_completed();
        }

        throttle
    }
}

impl ThrottleSource for ReplayEngine {
    fn next_throttle(&mut self) -> u32 {
        self.next()
    }
}

fn validate_table(table: &[LapPoint]) -> Result<(), ReplayTableError> {
    if table.len() < 2 {
        return Err(ReplayTableError::TooShort);
    }
    if table
        .windows(2)
        .any(|pair| pair[0].elapsed_ms >= pair[1].elapsed_ms)
    {
        return Err(ReplayTableError::NotAscending);
    }
    Ok(())
}
