//! Attribute handle routing
//!
//! Maps the value handles a host stack assigns back to the characteristic
//! declarations whose access callbacks serve them, and checks that the
//! application services fit in the host's attribute table.

use heapless::Vec;

use crate::config::ble::{HOST_ATTRIBUTES, MAX_ROUTES};
use crate::gatt::registry::RegistrationError;
use crate::gatt::service::{AttributeCounts, CharacteristicDef, Measurement, ServiceDef};
use crate::gatt::uuids::SENSOR_TEST_SERVICE_UUID;

/// A characteristic value handle and its declaration
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub handle: u16,
    pub characteristic: &'static CharacteristicDef,
}

/// Handle to characteristic table for one attribute table
pub struct RouteTable {
    table_size: usize,
    routes: Vec<Route, MAX_ROUTES>,
}

impl RouteTable {
    /// Create an empty table for a host with `table_size` attributes in total
    pub const fn new(table_size: usize) -> Self {
        Self {
            table_size,
            routes: Vec::new(),
        }
    }

    /// Check that `counts` fits beside the host's own services
    ///
    /// Clears any previously bound routes.
    pub fn reserve(&mut self, counts: &AttributeCounts) -> Result<(), RegistrationError> {
        if counts.attributes + HOST_ATTRIBUTES > self.table_size {
            return Err(RegistrationError::TableFull);
        }
        if counts.characteristics > MAX_ROUTES {
            return Err(RegistrationError::TooManyCharacteristics);
        }
        self.routes.clear();
        Ok(())
    }

    /// Route every characteristic of `services` to the handle `handle_of`
    /// gives its measurement
    pub fn bind(
        &mut self,
        services: &'static [ServiceDef],
        handle_of: impl Fn(Measurement) -> u16,
    ) -> Result<(), RegistrationError> {
        for service in services {
            if service.uuid != SENSOR_TEST_SERVICE_UUID {
                return Err(RegistrationError::UnknownService);
            }

            for chr in service.characteristics {
                let handle = handle_of(chr.measurement);
                self.routes
                    .push(Route {
                        handle,
                        characteristic: chr,
                    })
                    .map_err(|_| RegistrationError::TooManyCharacteristics)?;
                log::debug!("GATT: {} at handle {}", chr.name, handle);
            }
        }
        Ok(())
    }

    /// Look up the characteristic served at a value handle
    pub fn route(&self, handle: u16) -> Option<&'static CharacteristicDef> {
        self.routes
            .iter()
            .find(|r| r.handle == handle)
            .map(|r| r.characteristic)
    }
}
