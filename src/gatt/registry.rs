//! Two-phase GATT registration
//!
//! The host stack first sizes its attribute table from the counts of the
//! service descriptors, then commits the descriptors themselves.

use crate::gatt::service::{AttributeCounts, ServiceDef};

/// Errors that can occur while registering services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// The attribute table cannot hold the requested attributes
    TableFull,
    /// More characteristics than the host can route reads for
    TooManyCharacteristics,
    /// The host has no attribute storage for this service
    UnknownService,
}

impl RegistrationError {
    /// Non-zero status code reported to the caller of `gatt_init`
    pub const fn code(self) -> i32 {
        match self {
            Self::TableFull => 1,
            Self::TooManyCharacteristics => 2,
            Self::UnknownService => 3,
        }
    }
}

/// Registration interface of a BLE host stack
pub trait GattHost {
    /// Reserve room for `counts`
    fn count_cfg(&mut self, counts: &AttributeCounts) -> Result<(), RegistrationError>;

    /// Commit the service table
    fn add_svcs(&mut self, services: &'static [ServiceDef]) -> Result<(), RegistrationError>;
}

/// Size and register `services` with the host
///
/// Returns the first error from either phase. Expected to run once at
/// startup.
pub fn gatt_init<H: GattHost>(host: &mut H, services: &'static [ServiceDef]) -> Result<(), RegistrationError> {
    let counts = AttributeCounts::of(services);

    host.count_cfg(&counts).map_err(|e| {
        log::warn!("GATT: sizing {} attributes failed ({:?})", counts.attributes, e);
        e
    })?;

    host.add_svcs(services).map_err(|e| {
        log::warn!("GATT: registering services failed ({:?})", e);
        e
    })?;

    log::info!(
        "GATT: registered {} service(s), {} characteristic(s)",
        counts.services,
        counts.characteristics
    );
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::mock::MockGattHost;
    use super::*;
    use crate::gatt::access::{AttError, SensorBridge};
    use crate::gatt::service::SERVICES;
    use crate::gatt::uuids::{CHIP_ID_UUID, SENSOR_TEST_SERVICE_UUID, UVA_UUID, UVB_UUID};
    use crate::sensor::traits::mock::MockUvSensor;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_gatt_init_registers_one_service() {
        let mut host = MockGattHost::new(16);

        assert_eq!(gatt_init(&mut host, &SERVICES), Ok(()));

        assert_eq!(host.services().len(), 1);
        let service = host.services()[0];
        assert_eq!(service.uuid, SENSOR_TEST_SERVICE_UUID);
        assert_eq!(service.characteristics.len(), 3);
        assert!(service.characteristics.iter().all(|c| c.flags.is_read_only()));

        let uuids = [
            service.characteristics[0].uuid,
            service.characteristics[1].uuid,
            service.characteristics[2].uuid,
        ];
        assert_eq!(uuids, [CHIP_ID_UUID, UVA_UUID, UVB_UUID]);
    }

    #[test]
    fn test_gatt_init_sizes_before_registering() {
        let mut host = MockGattHost::new(16);
        gatt_init(&mut host, &SERVICES).unwrap();

        let counts = host.counts().unwrap();
        assert_eq!(counts.services, 1);
        assert_eq!(counts.characteristics, 3);
        assert_eq!(counts.attributes, 7);
    }

    #[test]
    fn test_sizing_failure_stops_registration() {
        let mut host = MockGattHost::new(4);

        let result = gatt_init(&mut host, &SERVICES);

        assert_eq!(result, Err(RegistrationError::TableFull));
        assert_ne!(result.unwrap_err().code(), 0);
        assert_eq!(host.add_calls(), 0);
        assert!(host.services().is_empty());
    }

    #[test]
    fn test_add_failure_is_returned() {
        let mut host = MockGattHost::new(16);
        host.set_next_add_error(RegistrationError::UnknownService);

        let result = gatt_init(&mut host, &SERVICES);

        assert_eq!(result, Err(RegistrationError::UnknownService));
        assert_eq!(result.unwrap_err().code(), 3);
    }

    #[test]
    fn test_error_codes_are_non_zero() {
        for error in [
            RegistrationError::TableFull,
            RegistrationError::TooManyCharacteristics,
            RegistrationError::UnknownService,
        ] {
            assert_ne!(error.code(), 0);
        }
    }

    #[test]
    fn test_registered_characteristics_serve_reads() {
        let mut host = MockGattHost::new(16);
        gatt_init(&mut host, &SERVICES).unwrap();

        let bridge: SensorBridge<NoopRawMutex, MockUvSensor> = SensorBridge::new();
        bridge.install(MockUvSensor::new(0x0026, 0x1234, 0x00FF));

        let service = host.services()[0];
        let mut responses: heapless::Vec<[u8; 2], 3> = heapless::Vec::new();
        for (handle, chr) in service.characteristics.iter().enumerate() {
            let mut buf: heapless::Vec<u8, 2> = heapless::Vec::new();
            bridge.access(0, handle as u16, chr, &mut buf).unwrap();
            responses.push([buf[0], buf[1]]).unwrap();
        }

        assert_eq!(responses.as_slice(), &[[0x00, 0x26], [0x12, 0x34], [0x00, 0xFF]]);

        let mut empty: heapless::Vec<u8, 0> = heapless::Vec::new();
        let uva = service.characteristic(&UVA_UUID).unwrap();
        assert_eq!(
            bridge.access(0, 2, uva, &mut empty),
            Err(AttError::InsufficientResources)
        );
    }
}
