//! Embassy tasks module
//!
//! Contains all async tasks for the firmware, organised by functionality.

pub mod ble;
pub mod sensor;

pub use ble::ble_task;
pub use sensor::sensor_task;
