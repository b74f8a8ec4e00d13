//! Advertised device name

use crate::config::ble::DEVICE_NAME_PREFIX;

/// Length of the name buffer
pub const DEVICE_NAME_MAX: usize = 20;

/// Format device ID bytes as uppercase hex after the name prefix
/// Returns the formatted string slice
pub fn format_device_name<'a>(buf: &'a mut [u8; DEVICE_NAME_MAX], device_id: &[u8; 3]) -> &'a str {
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    let prefix = DEVICE_NAME_PREFIX.as_bytes();

    buf[..prefix.len()].copy_from_slice(prefix);

    let mut pos = prefix.len();
    for &byte in device_id {
        buf[pos] = HEX_CHARS[(byte >> 4) as usize];
        buf[pos + 1] = HEX_CHARS[(byte & 0x0F) as usize];
        pos += 2;
    }

    // All bytes are ASCII, so this will always succeed
    core::str::from_utf8(&buf[..pos]).unwrap_or(DEVICE_NAME_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_device_name() {
        let mut buf = [0u8; DEVICE_NAME_MAX];
        assert_eq!(format_device_name(&mut buf, &[0x0A, 0xBC, 0xF1]), "UvSensor-0ABCF1");
    }

    #[test]
    fn test_name_fits_advertising_buffer() {
        let mut buf = [0u8; DEVICE_NAME_MAX];
        let name = format_device_name(&mut buf, &[0xFF; 3]);
        assert_eq!(name.len(), DEVICE_NAME_PREFIX.len() + 6);
        assert!(name.len() <= DEVICE_NAME_MAX);
    }
}
