//! BlueZ D-Bus backend for thermometer scanning.
//!
//! This backend uses the `bluer` crate to communicate with the BlueZ daemon
//! via D-Bus. It requires the `bluetoothd` daemon to be running.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, Advertisement, ScanError};
use crate::device_id::DeviceId;
use bluer::monitor::{Monitor, MonitorEvent, Pattern};
use bluer::{Adapter, Address, Device, DeviceEvent, DeviceProperty, Session, Uuid};
use futures::{Stream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::sync::mpsc;

/// Service data AD type for 16-bit service UUIDs.
pub const SERVICE_DATA_16_TYPE: u8 = 0x16;

/// Environmental Sensing UUID (0x181A) as it appears on air, little-endian.
pub const ENVIRONMENTAL_SENSING_UUID_BYTES: [u8; 2] = [0x1a, 0x18];

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

type Watched = Arc<Mutex<HashSet<Address>>>;

/// Start scanning for Environmental Sensing advertisements using the BlueZ backend.
///
/// Powers the default adapter on and registers a passive advertisement monitor
/// matching 0x181A service data. Each matching device is then followed through
/// its property change events, so every new service-data update becomes one
/// [`Advertisement`]. Runs until the returned receiver is dropped.
pub async fn start_scan() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;
    log::info!(
        "Bluetooth adapter {} enabled. Scanning for advertisements...",
        adapter.name()
    );

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    let pattern = Pattern {
        data_type: SERVICE_DATA_16_TYPE,
        start_position: 0,
        content: ENVIRONMENTAL_SENSING_UUID_BYTES.to_vec(),
    };

    let monitor_manager = adapter.monitor().await?;
    let mut monitor_handle = monitor_manager
        .register(Monitor {
            patterns: Some(vec![pattern]),
            ..Default::default()
        })
        .await?;

    // Spawn a task that owns all Bluetooth state and runs the event loop
    tokio::spawn(async move {
        // Keep all Bluetooth state alive by moving it into this task
        let _session = session;
        let _monitor_manager = monitor_manager;
        let watched: Watched = Arc::default();

        while let Some(event) = monitor_handle.next().await {
            if tx.is_closed() {
                break;
            }
            if let MonitorEvent::DeviceFound(device_id) = event
                && let Err(e) = process_device(&adapter, device_id.device, &tx, &watched).await
            {
                log::debug!("{}: {e}", DeviceId::from(device_id.device));
            }
        }
    });

    Ok(rx)
}

/// Forward the current service data of a newly found device and start following its updates.
///
/// Devices that are already followed are skipped, so a repeated `DeviceFound`
/// does not replay cached service data.
async fn process_device(
    adapter: &Adapter,
    address: Address,
    tx: &mpsc::Sender<Advertisement>,
    watched: &Watched,
) -> Result<(), ScanError> {
    if !start_watching(watched, address) {
        return Ok(());
    }

    let result = forward_and_follow(adapter, address, tx, watched).await;
    if result.is_err() {
        stop_watching(watched, address);
    }
    result
}

async fn forward_and_follow(
    adapter: &Adapter,
    address: Address,
    tx: &mpsc::Sender<Advertisement>,
    watched: &Watched,
) -> Result<(), ScanError> {
    let device = adapter.device(address)?;
    let name = device.name().await?.unwrap_or_default();

    if let Some(service_data) = device.service_data().await? {
        let _ = tx.send(advertisement(address, &name, service_data)).await;
    }

    let events = device.events().await?;
    tokio::spawn(follow_device(
        device,
        name,
        events,
        tx.clone(),
        Arc::clone(watched),
    ));

    Ok(())
}

/// Mark `address` as followed. Returns `false` if it already was.
fn start_watching(watched: &Watched, address: Address) -> bool {
    watched
        .lock()
        .map(|mut set| set.insert(address))
        .unwrap_or(false)
}

fn stop_watching(watched: &Watched, address: Address) {
    if let Ok(mut set) = watched.lock() {
        set.remove(&address);
    }
}

/// Emit an advertisement for every service-data change reported for `device`.
async fn follow_device(
    device: Device,
    mut name: String,
    events: impl Stream<Item = DeviceEvent>,
    tx: mpsc::Sender<Advertisement>,
    watched: Watched,
) {
    let address = device.address();
    let mut events = std::pin::pin!(events);

    while let Some(event) = events.next().await {
        match event {
            DeviceEvent::PropertyChanged(DeviceProperty::Name(new_name)) => name = new_name,
            DeviceEvent::PropertyChanged(DeviceProperty::ServiceData(service_data)) => {
                if tx
                    .send(advertisement(address, &name, service_data))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            _ => {}
        }
    }

    stop_watching(&watched, address);
}

fn advertisement(
    address: Address,
    name: &str,
    service_data: HashMap<Uuid, Vec<u8>>,
) -> Advertisement {
    Advertisement {
        address: address.into(),
        name: name.to_string(),
        service_data: service_data.into_iter().collect(),
        received_at: SystemTime::now(),
    }
}
