//! config.rs
//! Startup-resolved configuration for the sensor layer.
//!
//! Everything the firmware selected at compile time — resolution, safety
//! check toggles, tick rate, replay vs. live acquisition — is resolved
//! here once during bring-up and passed down by handle. Validation
//! failure is fatal; the dependent tasks must not start.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("output resolution {output} bits exceeds input resolution {input} bits")]
    OutputExceedsInput { input: u8, output: u8 },
    #[error("input resolution must be 1..=16 bits, got {0}")]
    BadInputResolution(u8),
    #[error("output resolution must be non-zero")]
    ZeroOutputResolution,
    #[error("fraction {name} must lie in [0, 1]")]
    FractionOutOfRange { name: &'static str },
    #[error("tick rate must be non-zero")]
    ZeroTickRate,
    #[error("tick rate {0} Hz does not divide 1000 ms evenly")]
    UnevenTickRate(u32),
    #[error("queue capacity must be non-zero")]
    ZeroQueueCapacity,
}

/// Throttle source selection, fixed at startup. Exactly one of the two
/// supplies throttle values to the sensor task, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Dual-sensor safety pipeline against the ADC collaborator.
    Live,
    /// Table-driven deterministic replay of recorded lap data.
    Replay,
}

/// Scaling and safety-gate parameters for the throttle pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    pub input_resolution_bits: u8,
    pub output_resolution_bits: u8,
    /// Zero-output band as a fraction of the scaled range.
    pub deadzone_fraction: f32,
    /// Maximum cross-sensor discrepancy as a fraction of the scaled range.
    pub max_diff_fraction: f32,
    pub diff_check_enabled: bool,
    pub deadzone_enabled: bool,
}

impl ThrottleConfig {
    /// Bits discarded when scaling a raw reading down.
    pub fn scale_shift(&self) -> u32 {
        (self.input_resolution_bits - self.output_resolution_bits) as u32
    }

    /// Largest value representable at the output resolution.
    pub fn scaled_max(&self) -> u32 {
        (1u32 << self.output_resolution_bits) - 1
    }

    /// Deadzone cutoff, truncated toward zero.
    pub fn deadzone_threshold(&self) -> u32 {
        (self.deadzone_fraction * self.scaled_max() as f32) as u32
    }

    /// Discrepancy cutoff, truncated toward zero.
    pub fn max_diff_threshold(&self) -> u32 {
        (self.max_diff_fraction * self.scaled_max() as f32) as u32
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            input_resolution_bits: 16,
            output_resolution_bits: 8,
            deadzone_fraction: 0.05,
            max_diff_fraction: 0.10,
            diff_check_enabled: true,
            deadzone_enabled: true,
        }
    }
}

/// Top-level configuration, resolved once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub throttle: ThrottleConfig,
    /// Clock tick rate and sensor loop rate, as in the original timer
    /// arrangement where one tick wakes the sensor task once.
    pub tick_rate_hz: u32,
    pub queue_capacity: usize,
    pub replay_mode: ReplayMode,
    pub replay_total_laps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            tick_rate_hz: 100,
            queue_capacity: 16,
            replay_mode: ReplayMode::Replay,
            replay_total_laps: 3,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.throttle;
        if t.input_resolution_bits == 0 || t.input_resolution_bits > 16 {
            return Err(ConfigError::BadInputResolution(t.input_resolution_bits));
        }
        if t.output_resolution_bits == 0 {
            return Err(ConfigError::ZeroOutputResolution);
        }
        if t.output_resolution_bits > t.input_resolution_bits {
            return Err(ConfigError::OutputExceedsInput {
                input: t.input_resolution_bits,
                output: t.output_resolution_bits,
            });
        }
        if !(0.0..=1.0).contains(&t.deadzone_fraction) {
            return Err(ConfigError::FractionOutOfRange {
                name: "deadzone_fraction",
            });
        }
        if !(0.0..=1.0).contains(&t.max_diff_fraction) {
            return Err(ConfigError::FractionOutOfRange {
                name: "max_diff_fraction",
            });
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if 1000 % self.tick_rate_hz != 0 {
            return Err(ConfigError::UnevenTickRate(self.tick_rate_hz));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn thresholds_truncate_toward_zero() {
        let t = ThrottleConfig::default();
        // 8-bit range: 0.05 * 255 = 12.75 -> 12, 0.10 * 255 = 25.5 -> 25
        assert_eq!(t.scaled_max(), 255);
        assert_eq!(t.deadzone_threshold(), 12);
        assert_eq!(t.max_diff_threshold(), 25);
        assert_eq!(t.scale_shift(), 8);
    }

    #[test]
    fn rejects_output_wider_than_input() {
        let mut config = Config::default();
        config.throttle.input_resolution_bits = 8;
        config.throttle.output_resolution_bits = 10;
        assert_eq!(
            config.validate().err(),
            Some(ConfigError::OutputExceedsInput {
                input: 8,
                output: 10
            })
        );
    }

    #[test]
    fn rejects_degenerate_rates_and_fractions() {
        let mut config = Config::default();
        config.tick_rate_hz = 0;
        assert_eq!(config.validate().err(), Some(ConfigError::ZeroTickRate));

        let mut config = Config::default();
        config.tick_rate_hz = 300;
        assert_eq!(
            config.validate().err(),
            Some(ConfigError::UnevenTickRate(300))
        );

        let mut config = Config::default();
        config.throttle.max_diff_fraction = 1.5;
        assert_eq!(
            config.validate().err(),
            Some(ConfigError::FractionOutOfRange {
                name: "max_diff_fraction"
            })
        );

        let mut config = Config::default();
        config.queue_capacity = 0;
        assert_eq!(
            config.validate().err(),
            Some(ConfigError::ZeroQueueCapacity)
        );
    }
}
