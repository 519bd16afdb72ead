use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("invalid {kind} channel {channel}")]
    InvalidChannel { kind: &'static str, channel: u8 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
