//! GATT bridge
//!
//! Publishes the UV sensor as the "Sensor Test" service: a static service
//! table, one access callback per characteristic, two-phase registration
//! with the host stack and the handle routes it produces.

pub mod access;
pub mod registry;
pub mod routes;
pub mod service;
pub mod uuids;

pub use access::{AttError, AttrBuf, BufferFull, ChannelReading, SensorBridge};
pub use registry::{gatt_init, GattHost, RegistrationError};
pub use routes::{Route, RouteTable};
pub use service::{AttributeCounts, CharFlags, CharacteristicDef, Measurement, ServiceDef, SENSOR_TEST_SERVICE, SERVICES};
