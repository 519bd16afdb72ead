#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Altitude control core (hardware-agnostic).
//!
//! All hardware interactions go through the `hover_traits` collaborator
//! traits.
//!
//! ## Architecture
//!
//! - **Buffer**: fixed-capacity SPSC sample buffer, latest-data-wins (`buffer`)
//! - **Sampling**: timer tick reading the altitude sensor (`sampler`)
//! - **Mapping**: averaging, altitude percent, clamped duty map (`mapping`)
//! - **Control**: the drain/average/actuate/display cycle (`control`)
//! - **Yaw**: quadrature decoder and its read-only view (`quadrature`)
//! - **Runner**: wiring of the above into a running `Rig` (`runner`)
//!
//! Arithmetic is integer throughout; samples are `i16`, sums and averages `i32`.

pub mod buffer;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod mapping;
pub mod mocks;
pub mod quadrature;
pub mod runner;
pub mod sampler;
pub mod util;

pub use config::{MappingCfg, PwmCfg, RunParams, RunnerCfg, SamplerCfg, YawCfg};
pub use control::{ControlLoop, CycleReport, Field};
pub use error::HoverError;
pub use mapping::{DUTY_CEIL, DUTY_FLOOR, DutyMap};
pub use quadrature::{Phase, QuadratureDecoder, Step, YawReader};
pub use runner::Rig;
pub use sampler::{SampleCount, SampleTick, Sampler};
