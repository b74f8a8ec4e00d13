//! `I2cTransmit` over an embedded-hal 1.0 blocking I2C bus

use embedded_hal::i2c::I2c;

use crate::sensor::traits::I2cTransmit;

/// Adapter giving any blocking embedded-hal I2C master the transmit contract
pub struct HalBus<I> {
    i2c: I,
}

impl<I: I2c> HalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }
}

impl<I: I2c> I2cTransmit for HalBus<I> {
    type Error = I::Error;

    fn transmit(&mut self, address: u8, request: &[u8], response: &mut [u8]) -> Result<(), I::Error> {
        if response.is_empty() {
            self.i2c.write(address, request)
        } else {
            // Repeated start between the command byte and the data
            self.i2c.write_read(address, request, response)
        }
    }
}
