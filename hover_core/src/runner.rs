use std::sync::atomic::AtomicBool;
use std::time::Duration;

use hover_traits::clock::{Clock, MonotonicClock};
use hover_traits::{AltitudeSensor, DisplaySink, PwmOutput};

use crate::buffer;
use crate::config::RunParams;
use crate::control::{ControlLoop, CycleReport};
use crate::error::Result as CoreResult;
use crate::quadrature::YawReader;
use crate::sampler::{SampleTick, Sampler};

/// A running sampler wired to its control loop.
///
/// The sampler thread starts in `start` and is stopped when the rig drops.
pub struct Rig<P, D, C = MonotonicClock> {
    control: ControlLoop<P, D, C>,
    _sampler: Sampler,
}

impl<P, D, C> Rig<P, D, C>
where
    P: PwmOutput,
    D: DisplaySink,
    C: Clock + Clone + Send + 'static,
{
    /// Allocate the buffer, start the sampler and apply the start-up duty.
    ///
    /// Every start-up failure surfaces here; once this returns the rig has
    /// no error path.
    pub fn start<S>(
        sensor: S,
        pwm: P,
        display: D,
        yaw: YawReader,
        params: &RunParams,
        clock: C,
    ) -> CoreResult<Self>
    where
        S: AltitudeSensor + Send + 'static,
    {
        let map = params.mapping.duty_map()?;
        let (producer, consumer) = buffer::init(params.sampler.buffer_size)?;
        let (tick, count) = SampleTick::new(sensor, producer);

        let mut control = ControlLoop::new(
            consumer,
            yaw,
            count,
            pwm,
            display,
            map,
            params.mapping.full_scale,
            params.pwm.frequency_hz,
            params.yaw.counts_per_rev,
            Duration::from_micros(params.runner.poll_us.max(1)),
            clock.clone(),
        );
        control.begin(params.pwm.default_duty);

        let sampler = Sampler::spawn(tick, params.sampler.rate_hz, clock)?;
        tracing::info!(
            rate_hz = params.sampler.rate_hz,
            window = params.sampler.buffer_size,
            "rig started"
        );
        Ok(Self {
            control,
            _sampler: sampler,
        })
    }

    pub fn step(&mut self, shutdown: &AtomicBool) -> Option<CycleReport> {
        self.control.step(shutdown)
    }

    pub fn run(&mut self, shutdown: &AtomicBool, max_cycles: Option<u64>) -> Option<CycleReport> {
        self.control.run(shutdown, max_cycles)
    }

    pub fn control(&self) -> &ControlLoop<P, D, C> {
        &self.control
    }
}
