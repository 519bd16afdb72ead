use thiserror::Error;

/// Start-up failures. Nothing in the running loop produces these: bad
/// samples are clamped, overruns overwrite, bad edges are ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HoverError {
    #[error("sample buffer capacity must be >= 1")]
    ZeroCapacity,
    #[error("sample buffer capacity {requested} exceeds maximum {max}")]
    CapacityTooLarge { requested: usize, max: usize },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("sampler thread failed: {0}")]
    Sampler(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
