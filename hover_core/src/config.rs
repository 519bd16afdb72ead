//! Runtime configuration types for the control core.
//!
//! These are the structs `Rig` and `ControlLoop` consume. They are separate
//! from the TOML-deserialized config in `hover_config`.

use crate::error::HoverError;
use crate::mapping::{DUTY_CEIL, DUTY_FLOOR, DutyMap};

/// Timer and averaging window.
#[derive(Debug, Clone)]
pub struct SamplerCfg {
    /// Sampler tick rate in Hz.
    pub rate_hz: u32,
    /// Sample buffer capacity; also the number of samples averaged per cycle.
    pub buffer_size: usize,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            rate_hz: 10,
            buffer_size: 1,
        }
    }
}

/// Actuator waveform.
#[derive(Debug, Clone)]
pub struct PwmCfg {
    pub frequency_hz: u32,
    /// Duty applied once at start-up, before the first control cycle.
    pub default_duty: u8,
}

impl Default for PwmCfg {
    fn default() -> Self {
        Self {
            frequency_hz: 150,
            default_duty: 50,
        }
    }
}

/// Sensor-to-output mapping.
#[derive(Debug, Clone)]
pub struct MappingCfg {
    pub sensor_min: i32,
    pub sensor_max: i32,
    pub min_duty: u8,
    pub max_duty: u8,
    /// Reading that counts as 100 % altitude.
    pub full_scale: i32,
}

impl Default for MappingCfg {
    fn default() -> Self {
        Self {
            sensor_min: 0,
            sensor_max: 1023,
            min_duty: DUTY_FLOOR,
            max_duty: DUTY_CEIL,
            full_scale: 1023,
        }
    }
}

impl MappingCfg {
    pub fn duty_map(&self) -> Result<DutyMap, HoverError> {
        DutyMap::new(self.sensor_min, self.sensor_max, self.min_duty, self.max_duty)
    }
}

/// Yaw encoder geometry.
#[derive(Debug, Clone)]
pub struct YawCfg {
    pub counts_per_rev: u32,
}

impl Default for YawCfg {
    fn default() -> Self {
        Self {
            counts_per_rev: 448,
        }
    }
}

/// Control-loop pacing.
#[derive(Debug, Clone)]
pub struct RunnerCfg {
    /// Back-off between polls of an empty sample buffer (µs).
    pub poll_us: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { poll_us: 1_000 }
    }
}

/// Everything needed to assemble a `Rig`.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub sampler: SamplerCfg,
    pub pwm: PwmCfg,
    pub mapping: MappingCfg,
    pub yaw: YawCfg,
    pub runner: RunnerCfg,
}
