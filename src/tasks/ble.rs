//! BLE task serving sensor reads
//!
//! Implements the BLE host task that manages connections and answers reads
//! of the sensor test service through the `SensorBridge`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;
use trouble_host::prelude::*;

use crate::ble::name::{format_device_name, DEVICE_NAME_MAX};
use crate::ble::{SensorTestService, TroubleRegistry};
use crate::config::ble::{ATTRIBUTE_TABLE_SIZE, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX};
use crate::gatt::service::{CharacteristicDef, SENSOR_VALUE_LEN};
use crate::gatt::{gatt_init, AttError, SensorBridge, SERVICES};
use crate::sensor::UvSensor;

/// BLE GATT Server with the sensor test service
#[gatt_server(mutex_type = CriticalSectionRawMutex, attribute_table_size = ATTRIBUTE_TABLE_SIZE)]
struct Server {
    sensor_test: SensorTestService,
}

/// Map a bridge error onto the ATT error sent to the client
fn att_error_code(error: AttError) -> AttErrorCode {
    match error {
        AttError::InsufficientResources => AttErrorCode::INSUFFICIENT_RESOURCES,
        AttError::UnlikelyError => AttErrorCode::UNLIKELY_ERROR,
    }
}

/// Take a fresh reading and store it as the characteristic value
fn refresh_value<S: UvSensor>(
    server: &Server<'_>,
    bridge: &SensorBridge<CriticalSectionRawMutex, S>,
    conn_handle: u16,
    attr_handle: u16,
    chr: &CharacteristicDef,
) -> Result<(), AttError> {
    let mut value: Vec<u8, SENSOR_VALUE_LEN> = Vec::new();
    bridge.access(conn_handle, attr_handle, chr, &mut value)?;

    let bytes: [u8; SENSOR_VALUE_LEN] = value
        .as_slice()
        .try_into()
        .map_err(|_| AttError::InsufficientResources)?;

    server
        .sensor_test
        .characteristic(chr.measurement)
        .set(server, &bytes)
        .map_err(|_| AttError::UnlikelyError)
}

/// Main BLE task that manages the Bluetooth stack and connections
///
/// This task:
/// 1. Initialises the BLE controller
/// 2. Registers the sensor test service
/// 3. Starts advertising as "UvSensor-XXXXXX" (unique per device)
/// 4. Answers reads with fresh sensor values
pub async fn ble_task<C: Controller, S: UvSensor>(
    controller: C,
    bridge: &SensorBridge<CriticalSectionRawMutex, S>,
    device_id: [u8; 3],
) {
    let mut device_name_buf = [0u8; DEVICE_NAME_MAX];
    let device_name = format_device_name(&mut device_name_buf, &device_id);

    log::info!("BLE: Starting as '{}'", device_name);

    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> =
        HostResources::new();

    // Address derived from device ID
    let stack = trouble_host::new(controller, &mut resources).set_random_address(Address::random([
        device_id[0],
        device_id[1],
        device_id[2],
        0x5E,
        0x75,
        0xC6,
    ]));

    let Host {
        mut peripheral,
        mut runner,
        ..
    } = stack.build();

    let gap = GapConfig::Peripheral(PeripheralConfig {
        name: device_name,
        appearance: &appearance::UNKNOWN,
    });
    let server: Server = match Server::new_with_config(gap) {
        Ok(s) => s,
        Err(_) => {
            log::error!("BLE: GATT server creation failed");
            return;
        }
    };

    let mut registry = TroubleRegistry::new(&server.sensor_test);
    if let Err(e) = gatt_init(&mut registry, &SERVICES) {
        log::error!("BLE: GATT init failed (code {})", e.code());
        return;
    }

    let runner_task = runner.run();

    let peripheral_task = async {
        let mut adv_data = [0u8; 31];
        let len = match AdStructure::encode_slice(
            &[
                AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED),
                AdStructure::CompleteLocalName(device_name.as_bytes()),
            ],
            &mut adv_data,
        ) {
            Ok(l) => l,
            Err(_) => return,
        };

        loop {
            log::info!("BLE: Advertising...");
            let advertiser = match peripheral
                .advertise(
                    &Default::default(),
                    Advertisement::ConnectableScannableUndirected {
                        adv_data: &adv_data[..len],
                        scan_data: &[],
                    },
                )
                .await
            {
                Ok(a) => a,
                Err(_) => continue,
            };

            let acceptor = match advertiser.accept().await {
                Ok(a) => a,
                Err(_) => continue,
            };

            let conn = match acceptor.with_attribute_server(&*server) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let conn_handle = conn.raw().handle().raw();
            log::info!("BLE: Connected (conn {})", conn_handle);

            loop {
                match conn.next().await {
                    GattConnectionEvent::Disconnected { reason: _ } => {
                        log::info!("BLE: Disconnected");
                        break;
                    }
                    GattConnectionEvent::Gatt { event } => match event {
                        GattEvent::Read(read_event) => {
                            let attr_handle = read_event.handle();
                            let result = match registry.route(attr_handle) {
                                Some(chr) => refresh_value(&server, bridge, conn_handle, attr_handle, chr),
                                None => Ok(()),
                            };

                            match result {
                                Ok(()) => {
                                    let _ = read_event.accept();
                                }
                                Err(e) => {
                                    let _ = read_event.reject(att_error_code(e));
                                }
                            }
                        }
                        GattEvent::Write(write_event) => {
                            let _ = write_event.accept();
                        }
                        GattEvent::Other(other_event) => {
                            let _ = other_event.accept();
                        }
                    },
                    _ => {}
                }
            }
        }
    };

    embassy_futures::select::select(runner_task, peripheral_task).await;
}
