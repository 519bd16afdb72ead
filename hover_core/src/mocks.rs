//! Test and helper doubles for hover_core collaborators.
use std::sync::{Arc, Mutex};

use hover_traits::{AltitudeSensor, DisplaySink, PwmOutput, Sample};

/// Replays a fixed list of readings, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    readings: Vec<Sample>,
    idx: usize,
}

impl ScriptedSensor {
    /// An empty script reads as 0.
    pub fn new(readings: Vec<Sample>) -> Self {
        Self { readings, idx: 0 }
    }
}

impl AltitudeSensor for ScriptedSensor {
    fn read_raw(&mut self) -> Sample {
        if self.readings.is_empty() {
            return 0;
        }
        let v = self.readings[self.idx % self.readings.len()];
        self.idx = self.idx.wrapping_add(1);
        v
    }
}

/// PWM spy that records every `set` call and the resulting output state.
#[derive(Debug, Default, Clone)]
pub struct SpyPwm {
    pub calls: Arc<Mutex<Vec<(u32, u8)>>>,
}

impl SpyPwm {
    /// Last applied `(frequency_hz, duty_percent)`, i.e. the waveform on the pin.
    pub fn state(&self) -> Option<(u32, u8)> {
        self.calls.lock().ok().and_then(|c| c.last().copied())
    }

    pub fn duties(&self) -> Vec<u8> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|&(_, d)| d).collect())
            .unwrap_or_default()
    }
}

impl PwmOutput for SpyPwm {
    fn set(&mut self, frequency_hz: u32, duty_percent: u8) {
        if let Ok(mut c) = self.calls.lock() {
            c.push((frequency_hz, duty_percent));
        }
    }
}

/// Display spy that records every write; `value` returns the latest per label.
#[derive(Debug, Default, Clone)]
pub struct SpyDisplay {
    pub rows: Arc<Mutex<Vec<(String, i64, u8)>>>,
}

impl SpyDisplay {
    /// Most recent value written under `label`.
    pub fn value(&self, label: &str) -> Option<i64> {
        self.rows.lock().ok().and_then(|rows| {
            rows.iter()
                .rev()
                .find(|(l, _, _)| l == label)
                .map(|&(_, v, _)| v)
        })
    }

    /// Row used for `label`, if it was ever written.
    pub fn y_pos(&self, label: &str) -> Option<u8> {
        self.rows.lock().ok().and_then(|rows| {
            rows.iter()
                .find(|(l, _, _)| l == label)
                .map(|&(_, _, y)| y)
        })
    }

    pub fn writes(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl DisplaySink for SpyDisplay {
    fn show(&mut self, label: &str, value: i64, y_pos: u8) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.push((label.to_string(), value, y_pos));
        }
    }
}
