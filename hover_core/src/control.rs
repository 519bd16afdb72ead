//! The foreground control loop.
//!
//! Each cycle drains exactly `capacity` samples, averages them, maps the
//! average to a clamped duty, drives the PWM output and refreshes the
//! display. There is no error path: out-of-range readings are absorbed by
//! the clamp, and the loop never gives up waiting for samples.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hover_traits::clock::{Clock, MonotonicClock};
use hover_traits::{DisplaySink, PwmOutput};

use crate::buffer::SampleConsumer;
use crate::mapping::{DutyMap, altitude_percent, average};
use crate::quadrature::YawReader;
use crate::sampler::SampleCount;

/// Display rows, in the order they are refreshed each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Yaw,
    Altitude,
    AltitudePercent,
    Count,
    PwmFreq,
    PwmDuty,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Yaw,
        Field::Altitude,
        Field::AltitudePercent,
        Field::Count,
        Field::PwmFreq,
        Field::PwmDuty,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Field::Yaw => "Yaw",
            Field::Altitude => "Altitude",
            Field::AltitudePercent => "Altitude %",
            Field::Count => "Count",
            Field::PwmFreq => "PWM Freq",
            Field::PwmDuty => "PWM Duty",
        }
    }

    /// Vertical pixel offset on the status display.
    pub const fn y_pos(self) -> u8 {
        match self {
            Field::Yaw => 5,
            Field::Altitude => 15,
            Field::Count => 25,
            Field::PwmFreq => 35,
            Field::PwmDuty => 45,
            Field::AltitudePercent => 55,
        }
    }
}

/// What one cycle computed and sent out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub sum: i32,
    pub average: i32,
    pub altitude_percent: i32,
    pub frequency_hz: u32,
    pub duty: u8,
    pub yaw: i32,
    pub yaw_degrees: i32,
    pub sample_count: u32,
}

impl CycleReport {
    pub fn value(&self, field: Field) -> i64 {
        match field {
            Field::Yaw => i64::from(self.yaw),
            Field::Altitude => i64::from(self.average),
            Field::AltitudePercent => i64::from(self.altitude_percent),
            Field::Count => i64::from(self.sample_count),
            Field::PwmFreq => i64::from(self.frequency_hz),
            Field::PwmDuty => i64::from(self.duty),
        }
    }
}

pub struct ControlLoop<P, D, C = MonotonicClock> {
    consumer: SampleConsumer,
    yaw: YawReader,
    count: SampleCount,
    pwm: P,
    display: D,
    map: DutyMap,
    full_scale: i32,
    frequency_hz: u32,
    counts_per_rev: u32,
    poll: Duration,
    clock: C,
    cycles: u64,
}

impl<P, D, C> ControlLoop<P, D, C>
where
    P: PwmOutput,
    D: DisplaySink,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        consumer: SampleConsumer,
        yaw: YawReader,
        count: SampleCount,
        pwm: P,
        display: D,
        map: DutyMap,
        full_scale: i32,
        frequency_hz: u32,
        counts_per_rev: u32,
        poll: Duration,
        clock: C,
    ) -> Self {
        Self {
            consumer,
            yaw,
            count,
            pwm,
            display,
            map,
            full_scale,
            frequency_hz,
            counts_per_rev,
            poll,
            clock,
            cycles: 0,
        }
    }

    /// Apply the start-up waveform before the first cycle.
    pub fn begin(&mut self, default_duty: u8) {
        let (lo, hi) = self.map.duty_band();
        let duty = default_duty.clamp(lo, hi);
        self.pwm.set(self.frequency_hz, duty);
        tracing::info!(
            frequency_hz = self.frequency_hz,
            duty,
            window = self.consumer.capacity(),
            "control loop start"
        );
    }

    /// Samples averaged per cycle.
    pub fn window(&self) -> usize {
        self.consumer.capacity()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Block until `window()` samples have been drained and return their sum.
    ///
    /// Re-polls the buffer with a short back-off while it is empty. Returns
    /// `None` only if `shutdown` is raised while waiting; the partial window
    /// is discarded.
    pub fn drain_window(&mut self, shutdown: &AtomicBool) -> Option<i32> {
        let mut sum: i32 = 0;
        for _ in 0..self.consumer.capacity() {
            let sample = loop {
                if let Some(s) = self.consumer.pop() {
                    break s;
                }
                if shutdown.load(Ordering::Relaxed) {
                    return None;
                }
                self.clock.sleep(self.poll);
            };
            // |i16| * 1024 fits comfortably in i32.
            sum += i32::from(sample);
        }
        Some(sum)
    }

    /// Steps 2–6 of a cycle for an already-drained window sum.
    pub fn apply_window(&mut self, sum: i32) -> CycleReport {
        let avg = average(sum, self.consumer.capacity());
        let pct = altitude_percent(avg, self.full_scale);
        let duty = self.map.calc_pwm_duty(avg);

        self.pwm.set(self.frequency_hz, duty);

        self.cycles = self.cycles.wrapping_add(1);
        let report = CycleReport {
            cycle: self.cycles,
            sum,
            average: avg,
            altitude_percent: pct,
            frequency_hz: self.frequency_hz,
            duty,
            yaw: self.yaw.get(),
            yaw_degrees: self.yaw.degrees(self.counts_per_rev),
            sample_count: self.count.get(),
        };

        for field in Field::ALL {
            self.display
                .show(field.label(), report.value(field), field.y_pos());
        }

        tracing::debug!(
            cycle = report.cycle,
            average = report.average,
            altitude_percent = report.altitude_percent,
            duty = report.duty,
            yaw = report.yaw,
            samples = report.sample_count,
            "control cycle"
        );
        report
    }

    /// One full cycle.
    pub fn step(&mut self, shutdown: &AtomicBool) -> Option<CycleReport> {
        let sum = self.drain_window(shutdown)?;
        Some(self.apply_window(sum))
    }

    /// Run cycles until `shutdown` is raised or `max_cycles` have completed.
    /// With no limit and no shutdown this never returns.
    pub fn run(&mut self, shutdown: &AtomicBool, max_cycles: Option<u64>) -> Option<CycleReport> {
        let mut last = None;
        let mut done: u64 = 0;
        while max_cycles.is_none_or(|max| done < max) {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            match self.step(shutdown) {
                Some(report) => {
                    last = Some(report);
                    done += 1;
                }
                None => break,
            }
        }
        tracing::info!(cycles = done, "control loop stopped");
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer;
    use crate::mocks::{ScriptedSensor, SpyDisplay, SpyPwm};
    use crate::quadrature::{Phase, QuadratureDecoder};
    use crate::sampler::SampleTick;
    use hover_traits::clock::test_clock::TestClock;

    struct Harness {
        tick: SampleTick<ScriptedSensor>,
        control: ControlLoop<SpyPwm, SpyDisplay, TestClock>,
        pwm: SpyPwm,
        display: SpyDisplay,
        decoder: QuadratureDecoder,
    }

    fn harness(window: usize, script: Vec<i16>) -> Harness {
        let (tx, rx) = buffer::init(window).unwrap();
        let (tick, count) = SampleTick::new(ScriptedSensor::new(script), tx);
        let (decoder, yaw) = QuadratureDecoder::new(Phase::from_pins(false, false));
        let pwm = SpyPwm::default();
        let display = SpyDisplay::default();
        let control = ControlLoop::new(
            rx,
            yaw,
            count,
            pwm.clone(),
            display.clone(),
            DutyMap::default(),
            1023,
            150,
            448,
            Duration::from_millis(1),
            TestClock::new(),
        );
        Harness {
            tick,
            control,
            pwm,
            display,
            decoder,
        }
    }

    #[test]
    fn window_of_four_averages_and_maps() {
        let mut h = harness(4, vec![100, 200, 150, 50]);
        for _ in 0..4 {
            h.tick.on_tick();
        }
        let stop = AtomicBool::new(false);
        let report = h.control.step(&stop).unwrap();
        assert_eq!(report.sum, 500);
        assert_eq!(report.average, 125);
        assert_eq!(report.altitude_percent, 12);
        assert_eq!(report.duty, 15);
        assert!(report.duty > 5 && report.duty < 95);
        assert_eq!(h.pwm.state(), Some((150, 15)));
        assert_eq!(report.sample_count, 4);
    }

    #[test]
    fn display_gets_every_field_on_its_row() {
        let mut h = harness(1, vec![512]);
        h.decoder.on_edge(false, true);
        h.decoder.on_edge(true, true);
        h.tick.on_tick();
        let stop = AtomicBool::new(false);
        h.control.step(&stop).unwrap();

        assert_eq!(h.display.writes(), Field::ALL.len());
        assert_eq!(h.display.value("Yaw"), Some(2));
        assert_eq!(h.display.value("Altitude"), Some(512));
        assert_eq!(h.display.value("Altitude %"), Some(50));
        assert_eq!(h.display.value("Count"), Some(1));
        assert_eq!(h.display.value("PWM Freq"), Some(150));
        assert_eq!(h.display.value("PWM Duty"), Some(50));
        assert_eq!(h.display.y_pos("Yaw"), Some(5));
        assert_eq!(h.display.y_pos("Altitude %"), Some(55));
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let mut h = harness(2, vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN]);
        let stop = AtomicBool::new(false);
        h.tick.on_tick();
        h.tick.on_tick();
        assert_eq!(h.control.step(&stop).unwrap().duty, 95);
        h.tick.on_tick();
        h.tick.on_tick();
        assert_eq!(h.control.step(&stop).unwrap().duty, 5);
    }

    #[test]
    fn begin_applies_default_duty() {
        let mut h = harness(1, vec![0]);
        h.control.begin(50);
        assert_eq!(h.pwm.state(), Some((150, 50)));
    }

    #[test]
    fn drain_gives_up_only_on_shutdown() {
        let mut h = harness(3, vec![1]);
        h.tick.on_tick();
        let stop = AtomicBool::new(true);
        assert_eq!(h.control.drain_window(&stop), None);
        assert_eq!(h.control.cycles(), 0);
    }

    #[test]
    fn run_honours_cycle_limit() {
        let mut h = harness(1, vec![300]);
        h.tick.on_tick();
        let stop = AtomicBool::new(false);
        let last = h.control.run(&stop, Some(1)).unwrap();
        assert_eq!(last.cycle, 1);
        assert_eq!(last.duty, 31);
        assert!(h.control.run(&stop, Some(0)).is_none());
    }

    #[test]
    fn window_of_one_follows_latest_sample() {
        let mut h = harness(1, vec![300, 600, 900]);
        let stop = AtomicBool::new(false);
        for _ in 0..3 {
            h.tick.on_tick();
            h.control.step(&stop).unwrap();
        }
        assert_eq!(h.pwm.duties(), vec![31, 57, 84]);
        assert_eq!(h.control.cycles(), 3);
    }

    #[test]
    fn overrun_before_drain_keeps_newest_window() {
        let mut h = harness(4, vec![1, 2, 3, 4, 5]);
        for _ in 0..5 {
            h.tick.on_tick();
        }
        let stop = AtomicBool::new(false);
        let report = h.control.step(&stop).unwrap();
        assert_eq!(report.sum, 2 + 3 + 4 + 5);
        assert_eq!(report.average, 3);
        assert_eq!(report.sample_count, 5);
    }
}
