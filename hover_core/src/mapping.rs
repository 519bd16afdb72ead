//! Integer mappings from the averaged altitude reading to outputs.
//!
//! All arithmetic is integer with truncation toward zero, in 64-bit
//! intermediates so no input in the `i16` sample range can overflow.

use crate::error::HoverError;

/// Lowest duty the control loop will ever command.
pub const DUTY_FLOOR: u8 = 5;
/// Highest duty the control loop will ever command.
pub const DUTY_CEIL: u8 = 95;

/// Mean of a drained window: `sum / n`, truncating toward zero.
#[inline]
pub fn average(sum: i32, n: usize) -> i32 {
    debug_assert!(n > 0, "average over an empty window");
    let n = i32::try_from(n.max(1)).unwrap_or(i32::MAX);
    sum / n
}

/// Altitude as a percentage of `full_scale`: `average * 100 / full_scale`.
#[inline]
pub fn altitude_percent(average: i32, full_scale: i32) -> i32 {
    if full_scale == 0 {
        return 0;
    }
    let pct = i64::from(average) * 100 / i64::from(full_scale);
    pct.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Clamped linear map from sensor units to a duty percentage.
///
/// `sensor_min` maps to `min_duty` and `sensor_max` to `max_duty`. The range
/// may be inverted (`sensor_min > sensor_max`) for sensors whose reading
/// falls as altitude rises; the map stays monotonic either way. Values beyond
/// the range saturate at the nearer end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyMap {
    sensor_min: i32,
    sensor_max: i32,
    min_duty: u8,
    max_duty: u8,
}

impl Default for DutyMap {
    /// 10-bit ADC full scale onto the 5..=95 band.
    fn default() -> Self {
        Self {
            sensor_min: 0,
            sensor_max: 1023,
            min_duty: DUTY_FLOOR,
            max_duty: DUTY_CEIL,
        }
    }
}

impl DutyMap {
    pub fn new(
        sensor_min: i32,
        sensor_max: i32,
        min_duty: u8,
        max_duty: u8,
    ) -> Result<Self, HoverError> {
        if sensor_min == sensor_max {
            return Err(HoverError::Config(
                "mapping.sensor_min and mapping.sensor_max must differ".into(),
            ));
        }
        if min_duty < DUTY_FLOOR || max_duty > DUTY_CEIL || min_duty >= max_duty {
            return Err(HoverError::Config(format!(
                "mapping duty band must satisfy {DUTY_FLOOR} <= min_duty < max_duty <= {DUTY_CEIL}, got {min_duty}..{max_duty}"
            )));
        }
        Ok(Self {
            sensor_min,
            sensor_max,
            min_duty,
            max_duty,
        })
    }

    /// Duty percentage for an averaged reading. Always within `[5, 95]`.
    pub fn calc_pwm_duty(&self, average: i32) -> u8 {
        let span_in = i64::from(self.sensor_max) - i64::from(self.sensor_min);
        let span_out = i64::from(self.max_duty) - i64::from(self.min_duty);
        let offset = i64::from(average) - i64::from(self.sensor_min);
        let raw = i64::from(self.min_duty) + offset * span_out / span_in;
        let duty = raw.clamp(i64::from(self.min_duty), i64::from(self.max_duty));
        (duty as u8).clamp(DUTY_FLOOR, DUTY_CEIL)
    }

    pub fn sensor_range(&self) -> (i32, i32) {
        (self.sensor_min, self.sensor_max)
    }

    pub fn duty_band(&self) -> (u8, u8) {
        (self.min_duty, self.max_duty)
    }
}
