#![no_main]
use libfuzzer_sys::fuzz_target;

use hover_core::{DUTY_CEIL, DUTY_FLOOR, DutyMap};

fuzz_target!(|input: (i32, i32, u8, u8, i32)| {
    let (lo, hi, dmin, dmax, avg) = input;
    if let Ok(map) = DutyMap::new(lo, hi, dmin, dmax) {
        let duty = map.calc_pwm_duty(avg);
        assert!((DUTY_FLOOR..=DUTY_CEIL).contains(&duty));
    }
});
