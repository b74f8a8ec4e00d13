//! 128-bit identifiers of the sensor test service
//!
//! These must not change: existing clients look them up by value.

use uuid::Uuid;

/// Sensor Test service
pub const SENSOR_TEST_SERVICE_UUID: Uuid = Uuid::from_u128(0x11a8564d_e4a9_4bc8_8775_140c25d30783);

/// Chip ID characteristic
pub const CHIP_ID_UUID: Uuid = Uuid::from_u128(0x0b08ccd6_27a1_4439_98b4_36878efafd7a);

/// UVA characteristic
pub const UVA_UUID: Uuid = Uuid::from_u128(0xcc7e9436_df5d_47c6_be2d_ee1490931b78);

/// UVB characteristic
pub const UVB_UUID: Uuid = Uuid::from_u128(0xbfdaa81e_8456_41f0_96f4_082e5cee2f00);

/// Byte order used in ATT PDUs: least-significant byte first
///
/// Not `Uuid::to_bytes_le`, which only swaps the first three fields.
pub const fn to_att_bytes(uuid: &Uuid) -> [u8; 16] {
    uuid.as_u128().to_le_bytes()
}
