//! BLE scanner abstraction for service-data advertisements.
//!
//! The BlueZ backend turns whatever the radio stack reports into
//! [`Advertisement`] events and delivers them through a channel. It does not
//! decode anything; UUID filtering and decoding happen in [`crate::collector`].

pub mod bluer;

use crate::device_id::DeviceId;
use std::time::SystemTime;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// GATT service 0x181A, Environmental Sensing.
pub const ENVIRONMENTAL_SENSING_UUID: Uuid = uuid_from_u16(0x181a);

/// Bluetooth Base UUID, into which 16-bit service identifiers are expanded.
const BLUETOOTH_BASE_UUID: u128 = 0x00000000_0000_1000_8000_00805f9b34fb;

/// Channel buffer size for advertisement events.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Expand a 16-bit assigned number into a full 128-bit Bluetooth UUID.
pub const fn uuid_from_u16(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID | ((short as u128) << 96))
}

/// One received advertisement, as reported by a scanner backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Advertisement {
    /// Peer address reported by the radio stack
    pub address: DeviceId,
    /// Advertised local name, empty when the device sends none
    pub name: String,
    /// Service data entries in the order they were advertised
    pub service_data: Vec<(Uuid, Vec<u8>)>,
    /// Wall-clock time the advertisement was received
    pub received_at: SystemTime,
}

impl Advertisement {
    /// Payloads advertised under the given service UUID.
    pub fn service_data_for(&self, uuid: Uuid) -> impl Iterator<Item = &[u8]> {
        self.service_data
            .iter()
            .filter(move |(id, _)| *id == uuid)
            .map(|(_, data)| data.as_slice())
    }
}

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Enable the radio and start scanning.
///
/// Returns a receiver of advertisements carrying service data. The channel
/// closes when the backend's event source ends.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    bluer::start_scan().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TEST_ID;

    #[test]
    fn test_environmental_sensing_uuid() {
        assert_eq!(
            ENVIRONMENTAL_SENSING_UUID.to_string(),
            "0000181a-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_uuid_from_u16() {
        assert_eq!(
            uuid_from_u16(0xfcd2).to_string(),
            "0000fcd2-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_service_data_for_filters_by_uuid() {
        let other = uuid_from_u16(0xfe95);
        let adv = Advertisement {
            address: TEST_ID,
            name: String::new(),
            service_data: vec![
                (other, vec![1, 2, 3]),
                (ENVIRONMENTAL_SENSING_UUID, vec![4, 5]),
                (ENVIRONMENTAL_SENSING_UUID, vec![6]),
            ],
            received_at: SystemTime::UNIX_EPOCH,
        };

        let payloads: Vec<&[u8]> = adv.service_data_for(ENVIRONMENTAL_SENSING_UUID).collect();
        assert_eq!(payloads, vec![&[4u8, 5][..], &[6u8][..]]);
        assert_eq!(adv.service_data_for(uuid_from_u16(0x1809)).count(), 0);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::Bluetooth("adapter not found".to_string());
        assert_eq!(format!("{}", err), "Bluetooth error: adapter not found");
    }
}
