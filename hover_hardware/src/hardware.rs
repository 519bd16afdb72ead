//! Raspberry Pi backends: MCP3008 altimeter over SPI, hardware PWM and the
//! yaw encoder on two GPIO interrupt lines.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use hover_core::quadrature::{Phase, QuadratureDecoder, YawReader};
use hover_traits::{AltitudeSensor, PwmOutput, Sample};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::{debug, trace, warn};

use crate::error::{HwError, Result};

const MCP3008_CLOCK_HZ: u32 = 1_350_000;

/// Analog altimeter on one channel of an MCP3008 (10-bit, SPI0/CE0).
pub struct Mcp3008Altimeter {
    spi: Spi,
    channel: u8,
    last: Sample,
}

impl Mcp3008Altimeter {
    pub fn new(channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::InvalidChannel {
                kind: "adc",
                channel,
            });
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, MCP3008_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self {
            spi,
            channel,
            last: 0,
        })
    }

    fn convert(&mut self) -> Result<Sample> {
        // Start bit, single-ended mode + channel, then clock out 10 bits.
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (i16::from(rx[1] & 0x03) << 8) | i16::from(rx[2]);
        trace!(raw, "mcp3008 raw read");
        Ok(raw)
    }
}

impl AltitudeSensor for Mcp3008Altimeter {
    fn read_raw(&mut self) -> Sample {
        match self.convert() {
            Ok(raw) => {
                self.last = raw;
                raw
            }
            Err(e) => {
                warn!(error = %e, last = self.last, "altimeter read failed, holding last value");
                self.last
            }
        }
    }
}

/// Motor drive on one of the SoC's two hardware PWM channels.
pub struct HardwarePwm {
    pwm: Pwm,
    state: Option<(u32, u8)>,
}

impl HardwarePwm {
    pub fn new(channel: u8) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => {
                return Err(HwError::InvalidChannel {
                    kind: "pwm",
                    channel: other,
                });
            }
        };
        let pwm = Pwm::new(channel).map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(Self { pwm, state: None })
    }
}

impl PwmOutput for HardwarePwm {
    fn set(&mut self, frequency_hz: u32, duty_percent: u8) {
        let duty = duty_percent.min(100);
        if self.state == Some((frequency_hz, duty)) {
            return;
        }
        let applied = self
            .pwm
            .set_frequency(f64::from(frequency_hz), f64::from(duty) / 100.0)
            .and_then(|()| {
                if self.state.is_none() {
                    self.pwm.set_polarity(Polarity::Normal)?;
                    self.pwm.enable()?;
                }
                Ok(())
            });
        match applied {
            Ok(()) => {
                debug!(frequency_hz, duty, "pwm updated");
                self.state = Some((frequency_hz, duty));
            }
            Err(e) => warn!(error = %e, frequency_hz, duty, "pwm update failed"),
        }
    }
}

/// Yaw encoder: both phase lines raise interrupts on either edge and feed
/// a shared decoder. Interrupts are cleared when this drops.
pub struct GpioEncoder {
    _pin_a: InputPin,
    _pin_b: InputPin,
}

impl GpioEncoder {
    pub fn new(pin_a: u8, pin_b: u8) -> Result<(Self, YawReader)> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut a = gpio
            .get(pin_a)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        let mut b = gpio
            .get(pin_b)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();

        let level_a = Arc::new(AtomicBool::new(a.is_high()));
        let level_b = Arc::new(AtomicBool::new(b.is_high()));
        let initial = Phase::from_pins(
            level_a.load(Ordering::Relaxed),
            level_b.load(Ordering::Relaxed),
        );
        let (decoder, yaw) = QuadratureDecoder::new(initial);
        let decoder = Arc::new(Mutex::new(decoder));

        a.set_async_interrupt(Trigger::Both, {
            let (mine, other) = (Arc::clone(&level_a), Arc::clone(&level_b));
            let decoder = Arc::clone(&decoder);
            move |level: Level| {
                let high = level == Level::High;
                mine.store(high, Ordering::Relaxed);
                if let Ok(mut d) = decoder.lock() {
                    d.on_edge(high, other.load(Ordering::Relaxed));
                }
            }
        })
        .map_err(|e| HwError::Gpio(e.to_string()))?;

        b.set_async_interrupt(Trigger::Both, {
            let (mine, other) = (Arc::clone(&level_b), Arc::clone(&level_a));
            let decoder = Arc::clone(&decoder);
            move |level: Level| {
                let high = level == Level::High;
                mine.store(high, Ordering::Relaxed);
                if let Ok(mut d) = decoder.lock() {
                    d.on_edge(other.load(Ordering::Relaxed), high);
                }
            }
        })
        .map_err(|e| HwError::Gpio(e.to_string()))?;

        debug!(pin_a, pin_b, "yaw encoder interrupts armed");
        Ok((
            Self {
                _pin_a: a,
                _pin_b: b,
            },
            yaw,
        ))
    }
}
