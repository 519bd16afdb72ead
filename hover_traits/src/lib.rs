//! Collaborator interfaces the control core drives.
//!
//! Implementations live outside the core (`hover_hardware`, test spies).
//! None of these calls report failure: a control loop has nowhere to send
//! it, so implementations absorb their own faults.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One raw altitude reading in sensor-native units (10-bit ADC in an `i16`).
pub type Sample = i16;

/// Source of raw altitude readings, polled once per sampler tick.
pub trait AltitudeSensor {
    /// Return the current raw reading. Must not block.
    fn read_raw(&mut self) -> Sample;
}

/// Single PWM actuator channel.
pub trait PwmOutput {
    /// Apply a waveform of `frequency_hz` with `duty_percent` high time.
    ///
    /// Idempotent: repeating the same arguments leaves the output unchanged.
    /// Accepts `0..=100`; the control loop only ever passes `5..=95`.
    fn set(&mut self, frequency_hz: u32, duty_percent: u8);
}

/// Status display with labelled rows.
pub trait DisplaySink {
    /// Write `label: value` on row `y_pos`.
    fn show(&mut self, label: &str, value: i64, y_pos: u8);
}

impl<T: AltitudeSensor + ?Sized> AltitudeSensor for Box<T> {
    fn read_raw(&mut self) -> Sample {
        (**self).read_raw()
    }
}

impl<T: PwmOutput + ?Sized> PwmOutput for Box<T> {
    fn set(&mut self, frequency_hz: u32, duty_percent: u8) {
        (**self).set(frequency_hz, duty_percent);
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show(&mut self, label: &str, value: i64, y_pos: u8) {
        (**self).show(label, value, y_pos);
    }
}
