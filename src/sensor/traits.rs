//! Sensor and bus traits for abstraction and testability
//!
//! `I2cTransmit` is the capability the driver needs from the board: one
//! blocking write-then-read transaction. `UvSensor` is what the GATT bridge
//! needs from the driver. Both can be swapped with mocks for testing.

use crate::config::sensor_defaults;

/// Errors that can occur during sensor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction failed
    Bus,
    /// No sensor installed, or an operation needs a prior `configure`
    NotConfigured,
    /// The ID register did not hold the expected value
    UnexpectedChipId(u16),
}

/// One blocking I2C transaction
///
/// Implementations own the concrete peripheral. The request is written to
/// `address`, then `response.len()` bytes are read back with a repeated
/// start. An empty `response` means a write-only transaction.
pub trait I2cTransmit {
    type Error: core::fmt::Debug;

    fn transmit(&mut self, address: u8, request: &[u8], response: &mut [u8]) -> Result<(), Self::Error>;
}

/// Measurement trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Continuous measurements
    Auto,
    /// One measurement per trigger (active force mode)
    Manual,
}

/// Integration time, which is also the conversion delay
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTime {
    Ms50 = 0,
    Ms100 = 1,
    Ms200 = 2,
    Ms400 = 3,
    Ms800 = 4,
}

impl IntegrationTime {
    /// Duration in milliseconds
    pub fn millis(self) -> u16 {
        match self {
            Self::Ms50 => 50,
            Self::Ms100 => 100,
            Self::Ms200 => 200,
            Self::Ms400 => 400,
            Self::Ms800 => 800,
        }
    }

    /// Try to convert a duration in milliseconds to an IntegrationTime
    pub fn from_millis(ms: u16) -> Option<Self> {
        match ms {
            50 => Some(Self::Ms50),
            100 => Some(Self::Ms100),
            200 => Some(Self::Ms200),
            400 => Some(Self::Ms400),
            800 => Some(Self::Ms800),
            _ => None,
        }
    }
}

/// Operating mode of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    pub trigger: TriggerMode,
    pub integration_time: IntegrationTime,
    /// Forwarded verbatim to the device; effect is vendor defined
    pub high_dynamic: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            trigger: if sensor_defaults::MANUAL_TRIGGER {
                TriggerMode::Manual
            } else {
                TriggerMode::Auto
            },
            integration_time: IntegrationTime::from_millis(sensor_defaults::INTEGRATION_TIME_MS)
                .unwrap_or(IntegrationTime::Ms100),
            high_dynamic: sensor_defaults::HIGH_DYNAMIC,
        }
    }
}

/// Abstract UV sensor interface
///
/// Every call performs a fresh bus transaction; nothing is cached.
pub trait UvSensor {
    /// Read the chip identification register
    fn read_chip_id(&mut self) -> Result<u16, SensorError>;

    /// Read the UVA measurement register
    fn read_uva(&mut self) -> Result<u16, SensorError>;

    /// Read the UVB measurement register
    fn read_uvb(&mut self) -> Result<u16, SensorError>;

    /// Write the operating mode
    ///
    /// Persists on the device until the next call or a power cycle.
    fn configure(
        &mut self,
        trigger: TriggerMode,
        integration_time: IntegrationTime,
        high_dynamic: bool,
    ) -> Result<(), SensorError>;
}
