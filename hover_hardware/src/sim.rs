//! Simulated rig: an altimeter that settles on a set point, a PWM output
//! that only remembers its waveform, and an encoder that spins at a fixed
//! rate. Used when the `hardware` feature is off, or when a hardware build
//! has no `[pins]` section in its config.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use hover_core::quadrature::{Phase, QuadratureDecoder};
use hover_traits::{AltitudeSensor, PwmOutput, Sample};

use crate::error::Result;

/// Highest code a 10-bit ADC can return.
pub const ADC_MAX: i32 = 1023;

/// Altimeter that approaches `target` from zero with bounded noise.
///
/// Noise comes from a fixed-seed xorshift so runs are repeatable.
pub struct SimulatedAltimeter {
    level: i32,
    target: i32,
    noise: i32,
    rng: u32,
}

impl SimulatedAltimeter {
    pub fn new(target: Sample, noise: Sample) -> Self {
        Self::with_seed(target, noise, 0x9E37_79B9)
    }

    pub fn with_seed(target: Sample, noise: Sample, seed: u32) -> Self {
        Self {
            level: 0,
            target: i32::from(target).clamp(0, ADC_MAX),
            noise: i32::from(noise).abs(),
            rng: seed.max(1),
        }
    }

    fn next_noise(&mut self) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        let span = (2 * self.noise + 1) as u32;
        (x % span) as i32 - self.noise
    }
}

impl AltitudeSensor for SimulatedAltimeter {
    fn read_raw(&mut self) -> Sample {
        // First-order lag toward the set point, at least one code per read.
        let gap = self.target - self.level;
        let step = match gap / 8 {
            0 => gap.signum(),
            s => s,
        };
        self.level += step;
        let reading = (self.level + self.next_noise()).clamp(0, ADC_MAX);
        // Clamped to 0..=1023 above.
        reading as Sample
    }
}

/// PWM output that records the last waveform applied.
#[derive(Debug, Default)]
pub struct SimulatedPwm {
    state: Option<(u32, u8)>,
    writes: u64,
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<(u32, u8)> {
        self.state
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PwmOutput for SimulatedPwm {
    fn set(&mut self, frequency_hz: u32, duty_percent: u8) {
        let duty = duty_percent.min(100);
        if duty != duty_percent {
            tracing::warn!(requested = duty_percent, "pwm duty above 100%, clamped");
        }
        self.writes += 1;
        if self.state != Some((frequency_hz, duty)) {
            tracing::debug!(frequency_hz, duty, "pwm (simulated)");
            self.state = Some((frequency_hz, duty));
        }
    }
}

/// Encoder that emits Gray-code edges into a decoder from its own thread.
///
/// Positive rates step forward, negative rates step back, zero emits nothing.
/// The thread stops and is joined on drop.
pub struct SimulatedEncoder {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedEncoder {
    pub fn spawn(mut decoder: QuadratureDecoder, counts_per_sec: i32) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        if counts_per_sec == 0 {
            return Ok(Self {
                shutdown,
                handle: None,
            });
        }

        let period = Duration::from_secs(1) / counts_per_sec.unsigned_abs();
        let forward = counts_per_sec > 0;
        let stop = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("hover-encoder-sim".into())
            .spawn(move || {
                let mut idx = Phase::FORWARD
                    .iter()
                    .position(|p| *p == decoder.phase())
                    .unwrap_or(0);
                let mut next = Instant::now() + period;
                while !stop.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if now < next {
                        std::thread::park_timeout(next - now);
                        continue;
                    }
                    idx = if forward { (idx + 1) % 4 } else { (idx + 3) % 4 };
                    let phase = Phase::FORWARD[idx];
                    decoder.on_edge(phase.a(), phase.b());
                    next += period;
                }
            })?;
        tracing::debug!(counts_per_sec, "simulated encoder started");
        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }
}

impl Drop for SimulatedEncoder {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altimeter_settles_near_target() {
        let mut alt = SimulatedAltimeter::new(600, 4);
        let mut last = 0;
        for _ in 0..200 {
            last = alt.read_raw();
        }
        assert!((596..=604).contains(&last), "settled at {last}");
    }

    #[test]
    fn altimeter_without_noise_is_monotonic_on_the_way_up() {
        let mut alt = SimulatedAltimeter::new(300, 0);
        let mut prev = alt.read_raw();
        for _ in 0..100 {
            let r = alt.read_raw();
            assert!(r >= prev);
            prev = r;
        }
        assert_eq!(prev, 300);
    }

    #[test]
    fn altimeter_is_repeatable_per_seed() {
        let mut a = SimulatedAltimeter::with_seed(512, 16, 42);
        let mut b = SimulatedAltimeter::with_seed(512, 16, 42);
        for _ in 0..50 {
            assert_eq!(a.read_raw(), b.read_raw());
        }
    }

    #[test]
    fn pwm_remembers_last_waveform() {
        let mut pwm = SimulatedPwm::new();
        assert_eq!(pwm.state(), None);
        pwm.set(150, 50);
        pwm.set(150, 50);
        pwm.set(150, 73);
        assert_eq!(pwm.state(), Some((150, 73)));
        assert_eq!(pwm.writes(), 3);
    }
}
