#![no_std]
#![no_main]

extern crate alloc;

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"),  // version
    env!("CARGO_PKG_NAME"),     // project_name
    "00:00:00",                 // build_time
    "2025-01-01",               // build_date
    "0.0.0",                    // idf_ver (not using IDF)
    0x10000,                    // mmu_page_size (64KB)
    0,                          // min_efuse_blk_rev_full (accept all)
    u16::MAX                    // max_efuse_blk_rev_full (accept all)
);

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use esp_backtrace as _;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::Blocking;
use static_cell::StaticCell;

mod ble;
mod config;
mod debug;
mod gatt;
mod sensor;
mod tasks;

use gatt::SensorBridge;
use sensor::{HalBus, SensorConfig, UvSensor, Veml6075};

/// The sensor as wired on this board
type SensorDriver = Veml6075<HalBus<I2c<'static, Blocking>>>;

/// Bridge shared by the BLE and sensor tasks
type Bridge = SensorBridge<CriticalSectionRawMutex, SensorDriver>;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

/// Static cell for esp-radio controller (needed for 'static lifetime)
static RADIO_CONTROLLER: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// Sensor bridge, empty until the driver is installed at boot
static SENSOR_BRIDGE: Bridge = SensorBridge::new();

#[esp_hal::main]
fn main() -> ! {
    // Initialise heap allocator for BLE support (64KB - BLE requires significant heap)
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    debug::init();

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Configure I2C for the VEML6075 (GPIO1 = SDA, GPIO2 = SCL)
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(config::i2c::FREQUENCY_KHZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO1)
    .with_scl(peripherals.GPIO2);

    let mut uv_sensor = Veml6075::new(HalBus::new(i2c));

    match uv_sensor.verify_chip_id() {
        Ok(id) => log::info!("Sensor: VEML6075 found (ID 0x{:04X})", id),
        Err(e) => log::warn!("Sensor: probe failed ({:?})", e),
    }

    let defaults = SensorConfig::default();
    if let Err(e) = uv_sensor.configure(defaults.trigger, defaults.integration_time, defaults.high_dynamic) {
        log::warn!("Sensor: configure failed ({:?})", e);
    }

    // Installed even if the probe failed; reads then report a GATT error
    SENSOR_BRIDGE.install(uv_sensor);
    let bridge: &'static Bridge = &SENSOR_BRIDGE;

    // Read unique device ID from eFuse MAC address (last 3 bytes)
    let mac = esp_hal::efuse::Efuse::read_base_mac_address();
    let device_id: [u8; 3] = [mac[3], mac[4], mac[5]];

    // Initialise esp-radio for BLE support (must be after esp_rtos::start)
    let radio_controller = RADIO_CONTROLLER.init(
        esp_radio::init().expect("Failed to initialize esp-radio")
    );

    // Create BLE connector (ownership is passed to ExternalController)
    let ble_connector = esp_radio::ble::controller::BleConnector::new(
        radio_controller,
        peripherals.BT,
        esp_radio::ble::Config::default(),
    ).expect("Failed to initialize BLE connector");

    // Wrap in ExternalController for trouble-host compatibility
    let controller: trouble_host::prelude::ExternalController<_, 10> =
        trouble_host::prelude::ExternalController::new(ble_connector);

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(async_main(spawner, controller, bridge, device_id));
    })
}

/// Type alias for the BLE controller
type BleController = trouble_host::prelude::ExternalController<
    esp_radio::ble::controller::BleConnector<'static>,
    10,
>;

#[embassy_executor::task]
async fn async_main(
    spawner: Spawner,
    ble_controller: BleController,
    bridge: &'static Bridge,
    device_id: [u8; 3],
) {
    spawner.spawn(sensor_poll_task(bridge)).unwrap();
    spawner.spawn(ble_host_task(ble_controller, bridge, device_id)).unwrap();
}

/// Task that keeps the sensor measuring and logs readings
#[embassy_executor::task]
async fn sensor_poll_task(bridge: &'static Bridge) {
    tasks::sensor_task(bridge).await;
}

/// Task that manages BLE connectivity
///
/// This task handles BLE advertising, connections, and answers reads of the
/// sensor test service.
#[embassy_executor::task]
async fn ble_host_task(controller: BleController, bridge: &'static Bridge, device_id: [u8; 3]) {
    tasks::ble_task(controller, bridge, device_id).await;
}
