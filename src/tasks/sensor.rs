//! Sensor task
//!
//! Keeps fresh data in the sensor registers. In manual mode it triggers one
//! measurement per poll interval; in both modes it logs the latest reading.
//! Bus access goes through the bridge, so it never overlaps a GATT read.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};

use crate::config::sensor_defaults::POLL_INTERVAL_MS;
use crate::gatt::SensorBridge;
use crate::sensor::{I2cTransmit, TriggerMode, Veml6075};

/// Task that polls the VEML6075
pub async fn sensor_task<T: I2cTransmit>(bridge: &SensorBridge<CriticalSectionRawMutex, Veml6075<T>>) {
    loop {
        let trigger = bridge.with_sensor_mut(|sensor| match sensor.config() {
            Some(config) if config.trigger == TriggerMode::Manual => {
                sensor.trigger_measurement()?;
                Ok(Some(config.integration_time.millis()))
            }
            _ => Ok(None),
        });

        match trigger {
            Ok(Some(conversion_ms)) => {
                // Result is ready after one integration period
                Timer::after(Duration::from_millis(conversion_ms as u64)).await;
            }
            Ok(None) => {}
            Err(e) => log::warn!("Sensor: trigger failed ({:?})", e),
        }

        let reading = bridge.read_channels();

        match reading {
            Ok(r) => log::debug!(
                "Sensor: UVA {} UVB {} COMP1 {} COMP2 {}",
                r.uva,
                r.uvb,
                r.visible_comp,
                r.ir_comp
            ),
            Err(e) => log::warn!("Sensor: read failed ({:?})", e),
        }

        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
