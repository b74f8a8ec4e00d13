//! Bluetooth Low Energy module
//!
//! Hosts the sensor test service on the TrouBLE stack. The attribute table
//! mirrors `gatt::SENSOR_TEST_SERVICE`; reads are routed back to the bridge
//! through `TroubleRegistry`.

pub mod name;
#[cfg(feature = "embedded")]
pub mod registry;
#[cfg(feature = "embedded")]
pub mod service;

pub use name::format_device_name;
#[cfg(feature = "embedded")]
pub use registry::TroubleRegistry;
#[cfg(feature = "embedded")]
pub use service::SensorTestService;
