//! BLE client for reading the UV sensor test service.

use std::time::Duration;

use anyhow::{anyhow, Result};
use btleplug::api::{Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::timeout;
use uuid::Uuid;

/// Sensor test service and its characteristics
pub const SENSOR_TEST_SERVICE_UUID: Uuid = Uuid::from_u128(0x11a8564d_e4a9_4bc8_8775_140c25d30783);
pub const CHIP_ID_UUID: Uuid = Uuid::from_u128(0x0b08ccd6_27a1_4439_98b4_36878efafd7a);
pub const UVA_UUID: Uuid = Uuid::from_u128(0xcc7e9436_df5d_47c6_be2d_ee1490931b78);
pub const UVB_UUID: Uuid = Uuid::from_u128(0xbfdaa81e_8456_41f0_96f4_082e5cee2f00);

/// Upper bound for a single characteristic read
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// BLE client connected to a UV sensor board.
pub struct SensorClient {
    peripheral: Peripheral,
    name: String,
    chip_id: Characteristic,
    uva: Characteristic,
    uvb: Characteristic,
}

impl SensorClient {
    /// Scan for a device whose name starts with `prefix` and connect.
    pub async fn connect_by_prefix(prefix: &str, scan_timeout: Duration) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No Bluetooth adapters found"))?;

        adapter.start_scan(ScanFilter::default()).await?;
        let (peripheral, name) = Self::find_device(&adapter, prefix, scan_timeout).await?;
        adapter.stop_scan().await?;

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let service = peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == SENSOR_TEST_SERVICE_UUID)
            .ok_or_else(|| anyhow!("Sensor test service not found"))?;

        let find = |uuid: Uuid, label: &str| {
            service
                .characteristics
                .iter()
                .find(|c| c.uuid == uuid)
                .cloned()
                .ok_or_else(|| anyhow!("{} characteristic not found", label))
        };

        let chip_id = find(CHIP_ID_UUID, "Chip ID")?;
        let uva = find(UVA_UUID, "UVA")?;
        let uvb = find(UVB_UUID, "UVB")?;

        Ok(Self {
            peripheral,
            name,
            chip_id,
            uva,
            uvb,
        })
    }

    /// Find the first advertiser whose local name starts with `prefix`.
    async fn find_device(adapter: &Adapter, prefix: &str, scan_timeout: Duration) -> Result<(Peripheral, String)> {
        let start = std::time::Instant::now();

        while start.elapsed() < scan_timeout {
            for peripheral in adapter.peripherals().await? {
                if let Some(props) = peripheral.properties().await? {
                    if let Some(local_name) = props.local_name {
                        if local_name.starts_with(prefix) {
                            return Ok((peripheral, local_name));
                        }
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Err(anyhow!("No device named '{}*' found within timeout", prefix))
    }

    /// Advertised name of the connected device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties of the three sensor characteristics, in table order.
    pub fn properties(&self) -> [CharPropFlags; 3] {
        [self.chip_id.properties, self.uva.properties, self.uvb.properties]
    }

    /// Read the raw value of the chip ID characteristic.
    pub async fn read_chip_id_raw(&self) -> Result<Vec<u8>> {
        self.read(&self.chip_id).await
    }

    /// Read the chip ID as a big-endian 16-bit value.
    pub async fn read_chip_id(&self) -> Result<u16> {
        decode_u16(&self.read(&self.chip_id).await?)
    }

    /// Read the raw UVA count.
    pub async fn read_uva(&self) -> Result<u16> {
        decode_u16(&self.read(&self.uva).await?)
    }

    /// Read the raw UVB count.
    pub async fn read_uvb(&self) -> Result<u16> {
        decode_u16(&self.read(&self.uvb).await?)
    }

    async fn read(&self, characteristic: &Characteristic) -> Result<Vec<u8>> {
        match timeout(READ_TIMEOUT, self.peripheral.read(characteristic)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(anyhow!("Timeout reading {}", characteristic.uuid)),
        }
    }

    /// Disconnect from the device.
    pub async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

/// Decode a characteristic value sent most significant byte first.
pub fn decode_u16(value: &[u8]) -> Result<u16> {
    match value {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(anyhow!("Expected 2 bytes, got {}", value.len())),
    }
}
