#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the hover controller.
//!
//! `Config` and its sections are deserialized from TOML and validated with
//! `Config::validate`. Every section has defaults matching the reference
//! firmware, so an empty file is a valid config.
use serde::Deserialize;

/// Largest averaging window accepted (matches the core's buffer ceiling).
pub const MAX_BUFFER_SIZE: usize = 1024;
/// Highest sampler rate accepted.
pub const MAX_RATE_HZ: u32 = 10_000;
/// Fastest simulated encoder, in counts per second either way.
pub const MAX_SIM_YAW_RATE: u32 = 100_000;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerCfg {
    /// Timer interrupt rate in Hz.
    pub rate_hz: u32,
    /// Averaging window and sample buffer capacity.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PwmCfg {
    pub frequency_hz: u32,
    /// Duty applied at start-up before the first control cycle.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MappingCfg {
    /// Raw reading mapped to `min_duty`.
    pub sensor_min: i32,
    /// Raw reading mapped to `max_duty`. May be below `sensor_min` for an inverted sensor.
    pub sensor_max: i32,
    pub min_duty: u8,
    pub max_duty: u8,
    /// Raw reading that displays as 100 % altitude.
    pub full_scale: i32,
}

impl Default for MappingCfg {
    fn default() -> Self {
        Self {
            sensor_min: 0,
            sensor_max: 1023,
            min_duty: 5,
            max_duty: 95,
            full_scale: 1023,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct YawCfg {
    /// Quadrature counts per full revolution (4 x encoder slots).
    pub counts_per_rev: u32,
}

impl Default for YawCfg {
    fn default() -> Self {
        Self {
            counts_per_rev: 448,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Back-off between polls of an empty sample buffer, in microseconds.
    pub poll_us: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { poll_us: 1_000 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // file layer only, e.g. "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    /// Altitude the simulated sensor settles on, in raw counts.
    pub altitude_raw: i16,
    /// Noise amplitude (+/-) added to each simulated reading, in raw counts.
    pub noise_raw: i16,
    /// Simulated encoder speed in quadrature counts per second (negative = reverse).
    pub yaw_counts_per_sec: i32,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            altitude_raw: 512,
            noise_raw: 8,
            yaw_counts_per_sec: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerCfg,
    pub pwm: PwmCfg,
    pub mapping: MappingCfg,
    pub yaw: YawCfg,
    pub runner: RunnerCfg,
    pub logging: Logging,
    /// Simulated hardware knobs (ignored by the `hardware` backend).
    pub sim: SimCfg,
    /// Hardware pin/channel assignment; required only by the `hardware` backend.
    pub pins: Option<Pins>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Pins {
    /// BCM pin of encoder phase A.
    pub yaw_a: u8,
    /// BCM pin of encoder phase B.
    pub yaw_b: u8,
    /// Hardware PWM channel (0 or 1).
    pub pwm_channel: u8,
    /// MCP3008 input channel carrying the altitude signal (0..=7).
    pub adc_channel: u8,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sampler
        if self.sampler.rate_hz == 0 {
            eyre::bail!("sampler.rate_hz must be > 0");
        }
        if self.sampler.rate_hz > MAX_RATE_HZ {
            eyre::bail!("sampler.rate_hz must be <= {MAX_RATE_HZ}");
        }
        if self.sampler.buffer_size == 0 {
            eyre::bail!("sampler.buffer_size must be >= 1");
        }
        if self.sampler.buffer_size > MAX_BUFFER_SIZE {
            eyre::bail!("sampler.buffer_size must be <= {MAX_BUFFER_SIZE}");
        }

        // Mapping
        let m = &self.mapping;
        if m.sensor_min == m.sensor_max {
            eyre::bail!("mapping.sensor_min and mapping.sensor_max must differ");
        }
        if m.min_duty < 5 || m.max_duty > 95 || m.min_duty >= m.max_duty {
            eyre::bail!("mapping duty band must satisfy 5 <= min_duty < max_duty <= 95");
        }
        if m.full_scale == 0 {
            eyre::bail!("mapping.full_scale must be != 0");
        }

        // PWM
        if self.pwm.frequency_hz == 0 {
            eyre::bail!("pwm.frequency_hz must be > 0");
        }
        if !(m.min_duty..=m.max_duty).contains(&self.pwm.default_duty) {
            eyre::bail!(
                "pwm.default_duty must be within mapping duty band [{}, {}]",
                m.min_duty,
                m.max_duty
            );
        }

        // Yaw
        if self.yaw.counts_per_rev == 0 {
            eyre::bail!("yaw.counts_per_rev must be > 0");
        }

        // Runner
        if self.runner.poll_us == 0 {
            eyre::bail!("runner.poll_us must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Sim
        if self.sim.noise_raw < 0 {
            eyre::bail!("sim.noise_raw must be >= 0");
        }
        if self.sim.yaw_counts_per_sec.unsigned_abs() > MAX_SIM_YAW_RATE {
            eyre::bail!("sim.yaw_counts_per_sec must be within +/-{MAX_SIM_YAW_RATE}");
        }

        // Pins
        if let Some(p) = &self.pins {
            if p.yaw_a == p.yaw_b {
                eyre::bail!("pins.yaw_a and pins.yaw_b must differ");
            }
            if p.pwm_channel > 1 {
                eyre::bail!("pins.pwm_channel must be 0 or 1");
            }
            if p.adc_channel > 7 {
                eyre::bail!("pins.adc_channel must be in 0..=7");
            }
        }

        Ok(())
    }
}
