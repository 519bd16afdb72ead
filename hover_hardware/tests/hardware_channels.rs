#![cfg(all(feature = "hardware", target_os = "linux"))]

use hover_hardware::HwError;
use hover_hardware::hardware::{HardwarePwm, Mcp3008Altimeter};

// Channel validation happens before any peripheral is opened, so these run
// on any Linux host.

#[test]
fn adc_channel_out_of_range() {
    let err = Mcp3008Altimeter::new(8).err().expect("channel 8 must be rejected");
    assert!(matches!(
        err,
        HwError::InvalidChannel {
            kind: "adc",
            channel: 8
        }
    ));
}

#[test]
fn pwm_channel_out_of_range() {
    let err = HardwarePwm::new(2).err().expect("channel 2 must be rejected");
    assert!(format!("{err}").contains("invalid pwm channel 2"));
}
