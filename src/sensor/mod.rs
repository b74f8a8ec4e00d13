//! UV sensor driver
//!
//! VEML6075 register driver over an injected I2C transport.

#[cfg(feature = "embedded")]
pub mod hal;
pub mod traits;
pub mod veml6075;

#[cfg(feature = "embedded")]
pub use hal::HalBus;
pub use traits::{I2cTransmit, IntegrationTime, SensorConfig, SensorError, TriggerMode, UvSensor};
pub use veml6075::Veml6075;
