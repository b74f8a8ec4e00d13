//! Static GATT service table
//!
//! Declares the "Sensor Test" primary service with three read-only
//! characteristics. The table is built at compile time and handed to the
//! host stack once by `gatt_init`.
//!
//! - Service UUID: 11a8564d-e4a9-4bc8-8775-140c25d30783
//! - Chip ID: 0b08ccd6-27a1-4439-98b4-36878efafd7a (read)
//! - UVA: cc7e9436-df5d-47c6-be2d-ee1490931b78 (read)
//! - UVB: bfdaa81e-8456-41f0-96f4-082e5cee2f00 (read)
//!
//! Each read returns the raw 16-bit register value, big-endian.

use uuid::Uuid;

use crate::gatt::uuids::{CHIP_ID_UUID, SENSOR_TEST_SERVICE_UUID, UVA_UUID, UVB_UUID};
use crate::sensor::{SensorError, UvSensor};

/// Length of every characteristic value in this service
pub const SENSOR_VALUE_LEN: usize = 2;

/// Characteristic properties, using the ATT property bit values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharFlags(u8);

impl CharFlags {
    pub const READ: Self = Self(0x02);
    pub const WRITE: Self = Self(0x08);
    pub const NOTIFY: Self = Self(0x10);
    pub const INDICATE: Self = Self(0x20);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Readable and nothing else
    pub const fn is_read_only(self) -> bool {
        self.0 == Self::READ.0
    }

    /// Needs a Client Characteristic Configuration descriptor
    pub const fn needs_cccd(self) -> bool {
        self.contains(Self::NOTIFY) || self.contains(Self::INDICATE)
    }
}

/// Which sensor quantity a characteristic serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    ChipId,
    Uva,
    Uvb,
}

impl Measurement {
    /// Take one fresh reading from the sensor
    pub fn read<S: UvSensor>(self, sensor: &mut S) -> Result<u16, SensorError> {
        match self {
            Self::ChipId => sensor.read_chip_id(),
            Self::Uva => sensor.read_uva(),
            Self::Uvb => sensor.read_uvb(),
        }
    }
}

/// A characteristic declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicDef {
    pub name: &'static str,
    pub uuid: Uuid,
    pub flags: CharFlags,
    /// Selects the access handler
    pub measurement: Measurement,
}

/// A primary service declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDef {
    pub name: &'static str,
    pub uuid: Uuid,
    pub characteristics: &'static [CharacteristicDef],
}

impl ServiceDef {
    /// Find a characteristic by UUID
    pub fn characteristic(&self, uuid: &Uuid) -> Option<&'static CharacteristicDef> {
        let characteristics: &'static [CharacteristicDef] = self.characteristics;
        characteristics.iter().find(|c| c.uuid == *uuid)
    }
}

/// Resources a set of services needs in the attribute table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeCounts {
    pub services: usize,
    pub characteristics: usize,
    pub attributes: usize,
}

impl AttributeCounts {
    /// Count the attributes needed by `services`
    ///
    /// One per service declaration, two per characteristic (declaration and
    /// value), one more per characteristic that notifies or indicates.
    pub fn of(services: &[ServiceDef]) -> Self {
        let mut counts = Self::default();
        for service in services {
            counts.services += 1;
            counts.attributes += 1;
            for chr in service.characteristics {
                counts.characteristics += 1;
                counts.attributes += 2;
                if chr.flags.needs_cccd() {
                    counts.attributes += 1;
                }
            }
        }
        counts
    }
}

/// Chip ID characteristic
pub const CHIP_ID_CHARACTERISTIC: CharacteristicDef = CharacteristicDef {
    name: "Chip ID",
    uuid: CHIP_ID_UUID,
    flags: CharFlags::READ,
    measurement: Measurement::ChipId,
};

/// UVA characteristic
pub const UVA_CHARACTERISTIC: CharacteristicDef = CharacteristicDef {
    name: "UVA",
    uuid: UVA_UUID,
    flags: CharFlags::READ,
    measurement: Measurement::Uva,
};

/// UVB characteristic
pub const UVB_CHARACTERISTIC: CharacteristicDef = CharacteristicDef {
    name: "UVB",
    uuid: UVB_UUID,
    flags: CharFlags::READ,
    measurement: Measurement::Uvb,
};

/// Sensor Test service
pub const SENSOR_TEST_SERVICE: ServiceDef = ServiceDef {
    name: "Sensor Test",
    uuid: SENSOR_TEST_SERVICE_UUID,
    characteristics: &[CHIP_ID_CHARACTERISTIC, UVA_CHARACTERISTIC, UVB_CHARACTERISTIC],
};

/// Every service this firmware registers
pub static SERVICES: [ServiceDef; 1] = [SENSOR_TEST_SERVICE];
