pub mod display;
pub mod error;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware;

pub use display::ConsoleDisplay;
pub use error::HwError;
pub use sim::{SimulatedAltimeter, SimulatedEncoder, SimulatedPwm};
