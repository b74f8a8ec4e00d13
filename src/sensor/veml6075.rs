//! VEML6075 UVA/UVB light sensor driver
//!
//! Register-level driver over an injected `I2cTransmit`. Every register is
//! 16 bits wide and transferred least-significant byte first. Values are
//! returned as decoded from the bus; wire formatting for BLE is the caller's
//! job.

use crate::config::sensor;
use crate::sensor::traits::{I2cTransmit, IntegrationTime, SensorConfig, SensorError, TriggerMode, UvSensor};

/// VEML6075 command codes
mod reg {
    pub const UV_CONF: u8 = 0x00;
    pub const UVA_DATA: u8 = 0x07;
    pub const UVB_DATA: u8 = 0x09;
    pub const UVCOMP1_DATA: u8 = 0x0A;
    pub const UVCOMP2_DATA: u8 = 0x0B;
    pub const ID: u8 = 0x0C;
}

/// UV_CONF bit fields (low byte; high byte is reserved)
mod conf {
    /// Shutdown
    pub const SD: u16 = 1 << 0;
    /// Active force (manual trigger) mode
    pub const UV_AF: u16 = 1 << 1;
    /// Start one measurement in active force mode, self-clearing
    pub const UV_TRIG: u16 = 1 << 2;
    /// High dynamic setting
    pub const UV_HD: u16 = 1 << 3;
    pub const UV_IT_SHIFT: u16 = 4;
    pub const UV_IT_MASK: u16 = 0x07 << UV_IT_SHIFT;
}

/// Encode a configuration into the UV_CONF register word
pub fn config_word(config: &SensorConfig, trigger_now: bool, shutdown: bool) -> u16 {
    let mut word = ((config.integration_time as u16) << conf::UV_IT_SHIFT) & conf::UV_IT_MASK;

    if config.trigger == TriggerMode::Manual {
        word |= conf::UV_AF;
    }
    if config.high_dynamic {
        word |= conf::UV_HD;
    }
    if trigger_now {
        word |= conf::UV_TRIG;
    }
    if shutdown {
        word |= conf::SD;
    }

    word
}

/// VEML6075 driver
///
/// Owns its transport for its entire lifetime. Construction performs no I/O.
pub struct Veml6075<T: I2cTransmit> {
    transport: T,
    address: u8,
    config: Option<SensorConfig>,
}

impl<T: I2cTransmit> Veml6075<T> {
    /// Create a driver for a sensor at the default address
    pub fn new(transport: T) -> Self {
        Self::with_address(transport, sensor::I2C_ADDRESS)
    }

    /// Create a driver for a sensor at a specific address
    pub fn with_address(transport: T, address: u8) -> Self {
        Self {
            transport,
            address,
            config: None,
        }
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the underlying transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Last configuration successfully written to the device
    pub fn config(&self) -> Option<SensorConfig> {
        self.config
    }

    /// Read a 16-bit register
    fn read_register(&mut self, command: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.transport
            .transmit(self.address, &[command], &mut buf)
            .map_err(|e| {
                log::warn!("VEML6075: read of 0x{:02X} failed ({:?})", command, e);
                SensorError::Bus
            })?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a 16-bit register
    fn write_register(&mut self, command: u8, value: u16) -> Result<(), SensorError> {
        let [lsb, msb] = value.to_le_bytes();
        self.transport
            .transmit(self.address, &[command, lsb, msb], &mut [])
            .map_err(|e| {
                log::warn!("VEML6075: write of 0x{:02X} failed ({:?})", command, e);
                SensorError::Bus
            })
    }

    /// Read the UVCOMP1 (visible compensation) channel
    pub fn read_visible_comp(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::UVCOMP1_DATA)
    }

    /// Read the UVCOMP2 (infrared compensation) channel
    pub fn read_ir_comp(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::UVCOMP2_DATA)
    }

    /// Probe the chip and check its identification register
    pub fn verify_chip_id(&mut self) -> Result<u16, SensorError> {
        let id = self.read_chip_id()?;
        if id != sensor::CHIP_ID {
            return Err(SensorError::UnexpectedChipId(id));
        }
        Ok(id)
    }

    /// Start a single measurement in manual mode
    ///
    /// The result is available after the integration time has elapsed.
    pub fn trigger_measurement(&mut self) -> Result<(), SensorError> {
        let config = self.config.ok_or(SensorError::NotConfigured)?;
        self.write_register(reg::UV_CONF, config_word(&config, true, false))
    }

    /// Put the sensor into shutdown; the next `configure` powers it back on
    pub fn shutdown(&mut self) -> Result<(), SensorError> {
        let config = self.config.unwrap_or_default();
        self.write_register(reg::UV_CONF, config_word(&config, false, true))
    }
}

impl<T: I2cTransmit> UvSensor for Veml6075<T> {
    fn read_chip_id(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::ID)
    }

    fn read_uva(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::UVA_DATA)
    }

    fn read_uvb(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::UVB_DATA)
    }

    fn configure(
        &mut self,
        trigger: TriggerMode,
        integration_time: IntegrationTime,
        high_dynamic: bool,
    ) -> Result<(), SensorError> {
        let config = SensorConfig {
            trigger,
            integration_time,
            high_dynamic,
        };
        self.write_register(reg::UV_CONF, config_word(&config, false, false))?;
        self.config = Some(config);

        log::debug!(
            "VEML6075: configured {:?}, {} ms, HD={}",
            trigger,
            integration_time.millis(),
            high_dynamic
        );
        Ok(())
    }
}
