//! Hardware configuration constants for the ESP32-S3 with a VEML6075 UV sensor

/// I2C bus wiring
pub mod i2c {
    pub const SDA: u8 = 1;
    pub const SCL: u8 = 2;
    /// Standard mode; the VEML6075 also supports 400 kHz
    pub const FREQUENCY_KHZ: u32 = 100;
}

/// VEML6075 constants
pub mod sensor {
    /// Fixed 7-bit slave address
    pub const I2C_ADDRESS: u8 = 0x10;

    /// Value of the ID register (0x0C)
    pub const CHIP_ID: u16 = 0x0026;
}

/// Operating mode applied at boot
pub mod sensor_defaults {
    /// false = continuous (auto) mode, true = active force (manual) mode
    pub const MANUAL_TRIGGER: bool = false;
    /// One of 50, 100, 200, 400, 800
    pub const INTEGRATION_TIME_MS: u16 = 100;
    pub const HIGH_DYNAMIC: bool = false;
    /// Interval between sensor task polls (and manual triggers)
    pub const POLL_INTERVAL_MS: u64 = 1000;
}

/// BLE host configuration
pub mod ble {
    /// Device name prefix for advertising, followed by 6 hex digits of the MAC
    pub const DEVICE_NAME_PREFIX: &str = "UvSensor-";

    /// Number of maximum concurrent connections
    pub const CONNECTIONS_MAX: usize = 1;

    /// Number of L2CAP channels
    pub const L2CAP_CHANNELS_MAX: usize = 3;

    /// Size of the GATT server's attribute table, shared by the host's own
    /// services and the application services
    pub const ATTRIBUTE_TABLE_SIZE: usize = 16;

    /// Attributes the host adds itself: the GAP service with its device name
    /// and appearance characteristics, and the GATT service declaration
    pub const HOST_ATTRIBUTES: usize = 6;

    /// Characteristic routes the registry can hold
    pub const MAX_ROUTES: usize = 8;
}

/// Logging configuration
pub mod logging {
    pub const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Info;
}
