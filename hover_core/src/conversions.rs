//! `From` implementations bridging `hover_config` types to `hover_core` types.

use crate::config::{MappingCfg, PwmCfg, RunParams, RunnerCfg, SamplerCfg, YawCfg};

// ── SamplerCfg ───────────────────────────────────────────────────────────────

impl From<&hover_config::SamplerCfg> for SamplerCfg {
    fn from(c: &hover_config::SamplerCfg) -> Self {
        Self {
            rate_hz: c.rate_hz,
            buffer_size: c.buffer_size,
        }
    }
}

// ── PwmCfg ───────────────────────────────────────────────────────────────────

impl From<&hover_config::PwmCfg> for PwmCfg {
    fn from(c: &hover_config::PwmCfg) -> Self {
        Self {
            frequency_hz: c.frequency_hz,
            default_duty: c.default_duty,
        }
    }
}

// ── MappingCfg ───────────────────────────────────────────────────────────────

impl From<&hover_config::MappingCfg> for MappingCfg {
    fn from(c: &hover_config::MappingCfg) -> Self {
        Self {
            sensor_min: c.sensor_min,
            sensor_max: c.sensor_max,
            min_duty: c.min_duty,
            max_duty: c.max_duty,
            full_scale: c.full_scale,
        }
    }
}

// ── YawCfg / RunnerCfg ───────────────────────────────────────────────────────

impl From<&hover_config::YawCfg> for YawCfg {
    fn from(c: &hover_config::YawCfg) -> Self {
        Self {
            counts_per_rev: c.counts_per_rev,
        }
    }
}

impl From<&hover_config::RunnerCfg> for RunnerCfg {
    fn from(c: &hover_config::RunnerCfg) -> Self {
        Self { poll_us: c.poll_us }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&hover_config::Config> for RunParams {
    fn from(c: &hover_config::Config) -> Self {
        Self {
            sampler: (&c.sampler).into(),
            pwm: (&c.pwm).into(),
            mapping: (&c.mapping).into(),
            yaw: (&c.yaw).into(),
            runner: (&c.runner).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_with_config_crate() {
        let from_toml: RunParams = (&hover_config::Config::default()).into();
        let core = RunParams::default();
        assert_eq!(from_toml.sampler.rate_hz, core.sampler.rate_hz);
        assert_eq!(from_toml.sampler.buffer_size, core.sampler.buffer_size);
        assert_eq!(from_toml.pwm.frequency_hz, core.pwm.frequency_hz);
        assert_eq!(from_toml.pwm.default_duty, core.pwm.default_duty);
        assert_eq!(from_toml.mapping.sensor_max, core.mapping.sensor_max);
        assert_eq!(from_toml.mapping.full_scale, core.mapping.full_scale);
        assert_eq!(from_toml.yaw.counts_per_rev, core.yaw.counts_per_rev);
        assert_eq!(from_toml.runner.poll_us, core.runner.poll_us);
    }

    #[test]
    fn mapping_converts_to_duty_map() {
        let cfg = hover_config::load_toml("[mapping]\nsensor_min = 1023\nsensor_max = 0").unwrap();
        let params: RunParams = (&cfg).into();
        let map = params.mapping.duty_map().unwrap();
        assert_eq!(map.sensor_range(), (1023, 0));
        assert_eq!(map.calc_pwm_duty(0), 95);
    }
}
