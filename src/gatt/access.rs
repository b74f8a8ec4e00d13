//! Characteristic access callbacks
//!
//! The bridge owns the installed sensor behind a blocking mutex, so at most
//! one bus transaction is in flight no matter which connection or task
//! issues the read. Each access takes exactly one fresh reading and appends
//! it big-endian to the response buffer.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::gatt::service::{
    CharacteristicDef, Measurement, CHIP_ID_CHARACTERISTIC, SENSOR_VALUE_LEN, UVA_CHARACTERISTIC,
    UVB_CHARACTERISTIC,
};
use crate::sensor::{I2cTransmit, SensorError, UvSensor, Veml6075};

/// The output buffer has no room left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

/// Append-only attribute value buffer supplied by the host stack
///
/// A failed append must leave the buffer unchanged.
pub trait AttrBuf {
    fn append(&mut self, data: &[u8]) -> Result<(), BufferFull>;
}

impl<const N: usize> AttrBuf for heapless::Vec<u8, N> {
    fn append(&mut self, data: &[u8]) -> Result<(), BufferFull> {
        self.extend_from_slice(data).map_err(|_| BufferFull)
    }
}

/// ATT errors an access callback can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttError {
    /// The value did not fit in the response buffer
    InsufficientResources,
    /// The sensor could not be read
    UnlikelyError,
}

impl AttError {
    /// ATT protocol error code
    pub const fn code(self) -> u8 {
        match self {
            Self::InsufficientResources => 0x11,
            Self::UnlikelyError => 0x0E,
        }
    }
}

impl From<SensorError> for AttError {
    fn from(_: SensorError) -> Self {
        Self::UnlikelyError
    }
}

impl From<BufferFull> for AttError {
    fn from(_: BufferFull) -> Self {
        Self::InsufficientResources
    }
}

/// Bridge between GATT reads and the sensor
pub struct SensorBridge<M: RawMutex, S> {
    sensor: Mutex<M, RefCell<Option<S>>>,
}

impl<M: RawMutex, S: UvSensor> SensorBridge<M, S> {
    /// Create a bridge with no sensor installed
    pub const fn new() -> Self {
        Self {
            sensor: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the sensor, returning the previous one if any
    pub fn install(&self, sensor: S) -> Option<S> {
        self.sensor.lock(|cell| cell.borrow_mut().replace(sensor))
    }

    /// Run `f` with exclusive access to the sensor
    pub fn with_sensor_mut<R>(
        &self,
        f: impl FnOnce(&mut S) -> Result<R, SensorError>,
    ) -> Result<R, SensorError> {
        self.sensor.lock(|cell| match cell.borrow_mut().as_mut() {
            Some(sensor) => f(sensor),
            None => Err(SensorError::NotConfigured),
        })
    }

    /// Take one reading of `measurement`
    pub fn read(&self, measurement: Measurement) -> Result<u16, SensorError> {
        self.with_sensor_mut(|sensor| measurement.read(sensor))
    }

    /// Serve a read of `chr`
    ///
    /// Appends the reading big-endian to `buf`. Nothing is appended on error.
    pub fn access(
        &self,
        conn_handle: u16,
        attr_handle: u16,
        chr: &CharacteristicDef,
        buf: &mut impl AttrBuf,
    ) -> Result<(), AttError> {
        let value = self.read(chr.measurement).map_err(|e| {
            log::warn!(
                "GATT: {} read failed on conn {} attr {} ({:?})",
                chr.name,
                conn_handle,
                attr_handle,
                e
            );
            AttError::from(e)
        })?;

        let bytes: [u8; SENSOR_VALUE_LEN] = value.to_be_bytes();
        buf.append(&bytes).map_err(|e| {
            log::warn!("GATT: {} response buffer full", chr.name);
            AttError::from(e)
        })?;

        log::debug!("GATT: {} = 0x{:04X} (conn {})", chr.name, value, conn_handle);
        Ok(())
    }

    /// Access callback of the Chip ID characteristic
    pub fn access_chip_id(&self, conn_handle: u16, attr_handle: u16, buf: &mut impl AttrBuf) -> Result<(), AttError> {
        self.access(conn_handle, attr_handle, &CHIP_ID_CHARACTERISTIC, buf)
    }

    /// Access callback of the UVA characteristic
    pub fn access_uva(&self, conn_handle: u16, attr_handle: u16, buf: &mut impl AttrBuf) -> Result<(), AttError> {
        self.access(conn_handle, attr_handle, &UVA_CHARACTERISTIC, buf)
    }

    /// Access callback of the UVB characteristic
    pub fn access_uvb(&self, conn_handle: u16, attr_handle: u16, buf: &mut impl AttrBuf) -> Result<(), AttError> {
        self.access(conn_handle, attr_handle, &UVB_CHARACTERISTIC, buf)
    }
}

/// One reading of every VEML6075 channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelReading {
    pub uva: u16,
    pub uvb: u16,
    pub visible_comp: u16,
    pub ir_comp: u16,
}

impl<M: RawMutex, T: I2cTransmit> SensorBridge<M, Veml6075<T>> {
    /// Read all four channels
    ///
    /// The lock is taken once per register so a GATT read can be served
    /// between any two of them.
    pub fn read_channels(&self) -> Result<ChannelReading, SensorError> {
        Ok(ChannelReading {
            uva: self.read(Measurement::Uva)?,
            uvb: self.read(Measurement::Uvb)?,
            visible_comp: self.with_sensor_mut(|sensor| sensor.read_visible_comp())?,
            ir_comp: self.with_sensor_mut(|sensor| sensor.read_ir_comp())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::traits::mock::{MockTransport, MockUvSensor};
    use crate::sensor::{IntegrationTime, TriggerMode, Veml6075};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use heapless::Vec;

    type MockBridge = SensorBridge<NoopRawMutex, MockUvSensor>;
    type DriverBridge = SensorBridge<NoopRawMutex, Veml6075<MockTransport>>;

    fn mock_bridge(sensor: MockUvSensor) -> MockBridge {
        let bridge = MockBridge::new();
        bridge.install(sensor);
        bridge
    }

    fn driver_bridge() -> DriverBridge {
        let bridge = DriverBridge::new();
        bridge.install(Veml6075::new(MockTransport::new()));
        bridge
    }

    fn set_register(bridge: &DriverBridge, command: u8, value: u16) {
        bridge
            .with_sensor_mut(|sensor| {
                sensor.transport().set_register(command, value);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_uva_register_is_sent_big_endian() {
        let bridge = driver_bridge();
        set_register(&bridge, 0x07, 0x1234);

        let mut buf: Vec<u8, 16> = Vec::new();
        assert_eq!(bridge.access_uva(1, 0x0010, &mut buf), Ok(()));
        assert_eq!(buf.as_slice(), &[0x12, 0x34]);
    }

    #[test]
    fn test_chip_id_register_is_sent_big_endian() {
        let bridge = driver_bridge();
        set_register(&bridge, 0x0C, 0x00FF);

        let mut buf: Vec<u8, 16> = Vec::new();
        assert_eq!(bridge.access_chip_id(1, 0x000C, &mut buf), Ok(()));
        assert_eq!(buf.as_slice(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_every_characteristic_decodes_to_driver_value() {
        let bridge = mock_bridge(MockUvSensor::new(0x0026, 0xBEEF, 0x0102));

        for (chr, expected) in [
            (&CHIP_ID_CHARACTERISTIC, 0x0026u16),
            (&UVA_CHARACTERISTIC, 0xBEEF),
            (&UVB_CHARACTERISTIC, 0x0102),
        ] {
            let mut buf: Vec<u8, 16> = Vec::new();
            bridge.access(1, 0, chr, &mut buf).unwrap();

            assert_eq!(buf.len(), 2, "{}", chr.name);
            assert_eq!(u16::from_be_bytes([buf[0], buf[1]]), expected, "{}", chr.name);
        }
    }

    #[test]
    fn test_repeated_reads_are_identical_and_fresh() {
        let bridge = driver_bridge();
        set_register(&bridge, 0x09, 0x0A0B);

        let mut first: Vec<u8, 2> = Vec::new();
        let mut second: Vec<u8, 2> = Vec::new();
        bridge.access_uvb(1, 0, &mut first).unwrap();
        bridge.access_uvb(1, 0, &mut second).unwrap();

        assert_eq!(first, second);
        let count = bridge
            .with_sensor_mut(|sensor| Ok(sensor.transport().transaction_count()))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_read_after_configure_is_not_cached() {
        let bridge = driver_bridge();
        set_register(&bridge, 0x07, 0x0001);

        let mut buf: Vec<u8, 4> = Vec::new();
        bridge.access_uva(1, 0, &mut buf).unwrap();

        bridge
            .with_sensor_mut(|sensor| sensor.configure(TriggerMode::Auto, IntegrationTime::Ms800, false))
            .unwrap();
        set_register(&bridge, 0x07, 0x0800);

        bridge.access_uva(1, 0, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x00, 0x01, 0x08, 0x00]);
    }

    #[test]
    fn test_full_buffer_reports_insufficient_resources() {
        let bridge = mock_bridge(MockUvSensor::new(0x0026, 1, 2));

        let mut buf: Vec<u8, 0> = Vec::new();
        let result = bridge.access_uva(1, 0, &mut buf);

        assert_eq!(result, Err(AttError::InsufficientResources));
        assert_eq!(result.unwrap_err().code(), 0x11);
    }

    #[test]
    fn test_partial_room_appends_nothing() {
        let bridge = mock_bridge(MockUvSensor::new(0x0026, 1, 2));

        let mut buf: Vec<u8, 3> = Vec::new();
        buf.push(0xAA).unwrap();
        buf.push(0xBB).unwrap();

        assert_eq!(bridge.access_uvb(1, 0, &mut buf), Err(AttError::InsufficientResources));
        assert_eq!(buf.as_slice(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_bus_error_is_a_read_failure() {
        let bridge = driver_bridge();
        bridge
            .with_sensor_mut(|sensor| {
                sensor.transport().set_next_error();
                Ok(())
            })
            .unwrap();

        let mut buf: Vec<u8, 16> = Vec::new();
        let result = bridge.access_uva(1, 0, &mut buf);

        assert_eq!(result, Err(AttError::UnlikelyError));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_missing_sensor_is_a_read_failure() {
        let bridge = MockBridge::new();
        assert_eq!(bridge.read(Measurement::Uva), Err(SensorError::NotConfigured));

        let mut buf: Vec<u8, 16> = Vec::new();
        assert_eq!(bridge.access_chip_id(1, 0, &mut buf), Err(AttError::UnlikelyError));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_install_replaces_sensor() {
        let bridge = MockBridge::new();
        assert!(bridge.install(MockUvSensor::new(1, 2, 3)).is_none());
        assert_eq!(bridge.read(Measurement::ChipId), Ok(1));

        let previous = bridge.install(MockUvSensor::new(4, 5, 6)).unwrap();
        assert_eq!(previous.read_count(), 0);
        assert_eq!(bridge.read(Measurement::ChipId), Ok(4));
    }

    #[test]
    fn test_one_reading_per_access() {
        let bridge = mock_bridge(MockUvSensor::new(0x0026, 1, 2));

        let mut buf: Vec<u8, 16> = Vec::new();
        bridge.access_chip_id(1, 0, &mut buf).unwrap();
        bridge.access_uva(2, 0, &mut buf).unwrap();

        let reads = bridge.with_sensor_mut(|sensor| Ok(sensor.read_count())).unwrap();
        assert_eq!(reads, 2);
        assert_eq!(buf.as_slice(), &[0x00, 0x26, 0x00, 0x01]);
    }

    #[test]
    fn test_sensor_error_is_surfaced_once() {
        let bridge = mock_bridge(MockUvSensor::new(0x0026, 0x0300, 2));
        bridge
            .with_sensor_mut(|sensor| {
                sensor.set_next_error(SensorError::Bus);
                Ok(())
            })
            .unwrap();

        let mut buf: Vec<u8, 16> = Vec::new();
        assert_eq!(bridge.access_uva(1, 0, &mut buf), Err(AttError::UnlikelyError));

        bridge
            .with_sensor_mut(|sensor| {
                sensor.set_uva(0x0400);
                Ok(())
            })
            .unwrap();
        assert_eq!(bridge.access_uva(1, 0, &mut buf), Ok(()));
        assert_eq!(buf.as_slice(), &[0x04, 0x00]);
    }

    std::thread_local! {
        static LOCKS: core::cell::Cell<usize> = const { core::cell::Cell::new(0) };
    }

    /// Raw mutex counting lock acquisitions on the current thread
    struct CountingRawMutex;

    unsafe impl RawMutex for CountingRawMutex {
        const INIT: Self = CountingRawMutex;

        fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
            LOCKS.with(|locks| locks.set(locks.get() + 1));
            f()
        }
    }

    fn counting_bridge() -> SensorBridge<CountingRawMutex, Veml6075<MockTransport>> {
        let bridge = SensorBridge::new();
        bridge.install(Veml6075::new(MockTransport::new()));
        bridge
            .with_sensor_mut(|sensor| {
                let transport = sensor.transport();
                transport.set_register(0x07, 1);
                transport.set_register(0x09, 2);
                transport.set_register(0x0A, 3);
                transport.set_register(0x0B, 4);
                Ok(())
            })
            .unwrap();
        LOCKS.with(|locks| locks.set(0));
        bridge
    }

    #[test]
    fn test_read_channels_locks_once_per_register() {
        let bridge = counting_bridge();

        let reading = bridge.read_channels().unwrap();

        assert_eq!(
            reading,
            ChannelReading {
                uva: 1,
                uvb: 2,
                visible_comp: 3,
                ir_comp: 4,
            }
        );
        assert_eq!(LOCKS.with(|locks| locks.get()), 4);

        let transactions = bridge
            .with_sensor_mut(|sensor| Ok(sensor.transport().transaction_count()))
            .unwrap();
        assert_eq!(transactions, 4);
    }

    #[test]
    fn test_read_channels_stops_at_first_error() {
        let bridge = counting_bridge();
        bridge
            .with_sensor_mut(|sensor| {
                sensor.transport().set_next_error();
                Ok(())
            })
            .unwrap();
        LOCKS.with(|locks| locks.set(0));

        assert_eq!(bridge.read_channels(), Err(SensorError::Bus));
        assert_eq!(LOCKS.with(|locks| locks.get()), 1);
    }

    #[test]
    fn test_att_error_codes() {
        assert_eq!(AttError::InsufficientResources.code(), 0x11);
        assert_eq!(AttError::UnlikelyError.code(), 0x0E);
        assert_eq!(AttError::from(SensorError::NotConfigured), AttError::UnlikelyError);
    }
}
