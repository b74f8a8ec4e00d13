//! `GattHost` implementation over the TrouBLE attribute table
//!
//! The table itself is laid out at compile time by `#[gatt_server]` with
//! `ATTRIBUTE_TABLE_SIZE` entries. Sizing checks the descriptors against
//! that capacity, and committing routes each characteristic to the value
//! handle TrouBLE assigned it.

use crate::ble::service::SensorTestService;
use crate::config::ble::ATTRIBUTE_TABLE_SIZE;
use crate::gatt::registry::{GattHost, RegistrationError};
use crate::gatt::routes::RouteTable;
use crate::gatt::service::{AttributeCounts, CharacteristicDef, ServiceDef};

/// Registry binding service descriptors to the TrouBLE server
pub struct TroubleRegistry<'a> {
    service: &'a SensorTestService,
    routes: RouteTable,
}

impl<'a> TroubleRegistry<'a> {
    pub fn new(service: &'a SensorTestService) -> Self {
        Self {
            service,
            routes: RouteTable::new(ATTRIBUTE_TABLE_SIZE),
        }
    }

    /// Look up the characteristic served at a value handle
    pub fn route(&self, handle: u16) -> Option<&'static CharacteristicDef> {
        self.routes.route(handle)
    }
}

impl GattHost for TroubleRegistry<'_> {
    fn count_cfg(&mut self, counts: &AttributeCounts) -> Result<(), RegistrationError> {
        self.routes.reserve(counts)
    }

    fn add_svcs(&mut self, services: &'static [ServiceDef]) -> Result<(), RegistrationError> {
        let service = self.service;
        self.routes
            .bind(services, |measurement| service.characteristic(measurement).handle)
    }
}
