//! Debug logging via the USB serial JTAG port.
//!
//! Installs a `log` backend that prints each record on its own line. Output
//! is dropped when no host is attached.

use log::{Log, Metadata, Record};

use crate::config::logging;

struct JtagLogger;

static LOGGER: JtagLogger = JtagLogger;

impl Log for JtagLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            esp_println::println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Initialise the debug output system.
///
/// Must be called once during startup before any log output. Later calls
/// are ignored.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(logging::MAX_LEVEL);
    }
}
