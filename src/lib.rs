#![cfg_attr(not(test), no_std)]

pub mod ble;
pub mod config;
pub mod gatt;
pub mod sensor;

// These modules depend on the ESP32-S3 and BLE stack only available with embedded feature
#[cfg(feature = "embedded")]
pub mod debug;
#[cfg(feature = "embedded")]
pub mod tasks;
