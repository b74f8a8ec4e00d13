//! Sensor Test service definition for the TrouBLE attribute table
//!
//! Same UUIDs as `gatt::SENSOR_TEST_SERVICE`. Values are refreshed by the
//! BLE task right before each read is answered.

use trouble_host::prelude::*;

use crate::gatt::service::{Measurement, SENSOR_VALUE_LEN};

/// Sensor Test service
#[gatt_service(uuid = "11a8564d-e4a9-4bc8-8775-140c25d30783")]
pub struct SensorTestService {
    /// Chip ID, big-endian
    #[characteristic(uuid = "0b08ccd6-27a1-4439-98b4-36878efafd7a", read, value = [0u8; 2])]
    pub chip_id: [u8; SENSOR_VALUE_LEN],

    /// Raw UVA count, big-endian
    #[characteristic(uuid = "cc7e9436-df5d-47c6-be2d-ee1490931b78", read, value = [0u8; 2])]
    pub uva: [u8; SENSOR_VALUE_LEN],

    /// Raw UVB count, big-endian
    #[characteristic(uuid = "bfdaa81e-8456-41f0-96f4-082e5cee2f00", read, value = [0u8; 2])]
    pub uvb: [u8; SENSOR_VALUE_LEN],
}

impl SensorTestService {
    /// The characteristic holding `measurement`
    pub fn characteristic(&self, measurement: Measurement) -> &Characteristic<[u8; SENSOR_VALUE_LEN]> {
        match measurement {
            Measurement::ChipId => &self.chip_id,
            Measurement::Uva => &self.uva,
            Measurement::Uvb => &self.uvb,
        }
    }
}
