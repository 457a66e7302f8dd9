//! Canonical device identity for BLE thermometers.
//!
//! A `DeviceId` wraps the 6-byte MAC address of a sensor, most-significant
//! byte first. Its `Display` form is the metric label value: 12 uppercase hex
//! digits without separators.

use std::fmt;

/// A device MAC address stored as a compact 6-byte array, most-significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DeviceId(pub [u8; 6]);

impl DeviceId {
    /// Build an id from bytes already in natural (big-endian) MAC order.
    pub fn from_forward(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Build an id from bytes stored least-significant octet first.
    pub fn from_reversed(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Colon-separated notation, e.g. `A4:C1:38:00:11:22`.
    pub fn to_colon_string(&self) -> String {
        let b = &self.0;
        format!(
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl From<bluer::Address> for DeviceId {
    fn from(addr: bluer::Address) -> Self {
        Self(addr.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_twelve_uppercase_hex() {
        let id = DeviceId([0xa4, 0xc1, 0x38, 0x0b, 0xee, 0xff]);
        let s = id.to_string();
        assert_eq!(s, "A4C1380BEEFF");
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_display_with_zeros() {
        let id = DeviceId([0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(format!("{}", id), "000102030405");
    }

    #[test]
    fn test_from_reversed() {
        let id = DeviceId::from_reversed([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(id.to_string(), "060504030201");
    }

    #[test]
    fn test_from_forward() {
        let id = DeviceId::from_forward([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(id.to_string(), "010203040506");
    }

    #[test]
    fn test_colon_string() {
        let id = DeviceId([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(id.to_colon_string(), "AA:BB:CC:DD:EE:FF");
    }
}
