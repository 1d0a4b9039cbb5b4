use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};
use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::types::SerialConfig;
use crate::device::constants::UNKNOWN_NAME;
use crate::device::link::SerialLink;
use crate::device::scan::ScanSlot;
use crate::device::types::{Device, LinkEvent};
use crate::error::LinkError;

struct Session {
    peripheral: Peripheral,
    serial_char: Characteristic,
}

/// [`SerialLink`] for BLE serial (UART) modules, on top of btleplug.
///
/// btleplug has no notion of bonding or adapter power, so "paired" devices are the
/// peripherals the platform already knows that expose the serial service, and
/// enable/disable are reported as unsupported.
pub struct BtleSerial {
    config: SerialConfig,
    manager: OnceCell<Manager>,
    session: Mutex<Option<Session>>,
    // shared with event streams so they can tell which disconnect matters
    session_id: Arc<StdMutex<Option<PeripheralId>>>,
    // peripherals known before the running scan; those are not "discovered"
    known: Arc<StdMutex<HashSet<String>>>,
    discovery: StdMutex<ScanSlot>,
}

fn device_id(peripheral: &Peripheral) -> String {
    peripheral.id().to_string()
}

fn lock_std<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns the peripheral as a [`Device`] if it advertises `service`.
async fn serial_device(peripheral: &Peripheral, service: &Uuid) -> Option<Device> {
    match peripheral.properties().await {
        Err(err) => {
            warn!("Could not query peripheral for properties: {:?}", err);
            None
        },
        Ok(None) => {
            debug!("Peripheral has no properties");
            None
        },
        Ok(Some(properties)) => {
            // Some environments ignore the scan filter, so check the service uuid again
            if !properties.services.contains(service) {
                return None;
            }

            Some(Device {
                id: device_id(peripheral),
                name: properties.local_name.unwrap_or(String::from(UNKNOWN_NAME)),
            })
        },
    }
}

async fn find_serial_devices(adapters: &[Adapter], service: &Uuid) -> Vec<Device> {
    let mut devices = Vec::new();

    for adapter in adapters {
        let peripherals = match adapter.peripherals().await {
            Ok(v) => v,
            Err(err) => {
                warn!("Failed to query BLE adapter for peripherals: {}", err);
                continue;
            },
        };

        for peripheral in peripherals {
            if let Some(device) = serial_device(&peripheral, service).await {
                devices.push(device);
            }
        }
    }

    devices
}

async fn known_peripheral_ids(adapters: &[Adapter]) -> HashSet<String> {
    let mut ids = HashSet::new();

    for adapter in adapters {
        match adapter.peripherals().await {
            Ok(peripherals) => ids.extend(peripherals.iter().map(device_id)),
            Err(err) => warn!("Failed to query BLE adapter for peripherals: {}", err),
        }
    }

    ids
}

fn adapter_label(info: Result<String, btleplug::Error>) -> String {
    info.unwrap_or_else(|_| UNKNOWN_NAME.to_string())
}

/// Drops the devices that were already known when the scan started.
fn newly_found(devices: Vec<Device>, known: &HashSet<String>) -> Vec<Device> {
    devices.into_iter().filter(|device| !known.contains(&device.id)).collect()
}

async fn find_peripheral(adapters: &[Adapter], id: &str) -> Result<Peripheral, LinkError> {
    for adapter in adapters {
        let peripherals = match adapter.peripherals().await {
            Ok(v) => v,
            Err(err) => {
                warn!("Failed to query BLE adapter for peripherals: {}", err);
                continue;
            },
        };

        if let Some(peripheral) = peripherals.into_iter().find(|p| device_id(p) == id) {
            return Ok(peripheral);
        }
    }

    Err(LinkError::UnknownDevice(id.to_string()))
}

async fn open_serial(peripheral: &Peripheral, config: &SerialConfig) -> Result<Characteristic, LinkError> {
    info!("Connecting to peripheral {}...", device_id(peripheral));
    peripheral.connect().await?;

    info!("Connected; Discovering services...");
    peripheral.discover_services().await?;

    let serial_char = peripheral.characteristics().into_iter().find(|characteristic| {
        characteristic.service_uuid == config.service_uuid
            && characteristic.uuid == config.characteristic_uuid
    });

    match serial_char {
        Some(serial_char) => Ok(serial_char),
        None => {
            if let Err(err) = peripheral.disconnect().await {
                warn!("Failed to disconnect from peripheral without serial characteristic: {:?}", err);
            }
            Err(LinkError::MissingCharacteristic)
        },
    }
}

async fn translate_event(
    adapter: Adapter,
    event: CentralEvent,
    session_id: Arc<StdMutex<Option<PeripheralId>>>,
    known: Arc<StdMutex<HashSet<String>>>,
    service: Uuid,
) -> Option<LinkEvent> {
    match event {
        CentralEvent::DeviceDiscovered(id) => {
            if lock_std(&known).contains(&id.to_string()) {
                return None;
            }
            let peripheral = match adapter.peripheral(&id).await {
                Ok(v) => v,
                Err(err) => {
                    warn!("Discovered peripheral {} went away: {:?}", id, err);
                    return None;
                },
            };
            serial_device(&peripheral, &service).await.map(LinkEvent::DeviceDiscovered)
        },
        CentralEvent::DeviceDisconnected(id) => {
            let lost = lock_std(&session_id).as_ref() == Some(&id);
            if lost { Some(LinkEvent::ConnectionLost) } else { None }
        },
        _ => None,
    }
}

impl BtleSerial {
    pub fn new(config: SerialConfig) -> Self {
        BtleSerial {
            config,
            manager: OnceCell::new(),
            session: Mutex::new(None),
            session_id: Arc::new(StdMutex::new(None)),
            known: Arc::new(StdMutex::new(HashSet::new())),
            discovery: StdMutex::new(ScanSlot::default()),
        }
    }

    async fn adapters(&self) -> Result<Vec<Adapter>, LinkError> {
        let manager = self.manager.get_or_try_init(Manager::new).await?;
        let adapters = manager.adapters().await?;

        if adapters.is_empty() {
            return Err(LinkError::NoAdapter);
        }
        Ok(adapters)
    }

    fn write_type(&self) -> WriteType {
        if self.config.write_with_response { WriteType::WithResponse } else { WriteType::WithoutResponse }
    }

    async fn close_session(&self, session: &mut Option<Session>) -> Result<(), LinkError> {
        *lock_std(&self.session_id) = None;

        if let Some(session) = session.take() {
            info!("Disconnecting from peripheral {}", device_id(&session.peripheral));
            session.peripheral.disconnect().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SerialLink for BtleSerial {
    async fn is_enabled(&self) -> Result<bool, LinkError> {
        match self.adapters().await {
            Ok(_) => Ok(true),
            Err(LinkError::NoAdapter) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn list_paired(&self) -> Result<Vec<Device>, LinkError> {
        let adapters = self.adapters().await?;
        Ok(find_serial_devices(&adapters, &self.config.service_uuid).await)
    }

    async fn enable(&self) -> Result<(), LinkError> {
        Err(LinkError::Unsupported("turning the bluetooth adapter on"))
    }

    async fn disable(&self) -> Result<(), LinkError> {
        Err(LinkError::Unsupported("turning the bluetooth adapter off"))
    }

    async fn discover(&self, cancel: CancellationToken) -> Result<Vec<Device>, LinkError> {
        let adapters = self.adapters().await?;
        let filter = ScanFilter {
            services: vec![self.config.service_uuid],
        };

        let known = known_peripheral_ids(&adapters).await;
        *lock_std(&self.known) = known.clone();

        let scan = lock_std(&self.discovery).begin(cancel.clone());

        for adapter in &adapters {
            info!("Scanning using adapter {}...", adapter_label(adapter.adapter_info().await));
            if let Err(err) = adapter.start_scan(filter.clone()).await {
                lock_std(&self.discovery).finish(scan);
                return Err(err.into());
            }
        }

        cancel.cancelled().await;

        // a newer scan is running on the same adapters
        if !lock_std(&self.discovery).finish(scan) {
            info!("Scan {} was superseded", scan);
            return Ok(Vec::new());
        }

        for adapter in &adapters {
            if let Err(err) = adapter.stop_scan().await {
                warn!("Failed to stop scanning: {:?}", err);
            }
        }

        let found = find_serial_devices(&adapters, &self.config.service_uuid).await;
        Ok(newly_found(found, &known))
    }

    async fn cancel_discovery(&self) -> Result<(), LinkError> {
        lock_std(&self.discovery).cancel();
        Ok(())
    }

    async fn pair(&self, id: &str) -> Result<bool, LinkError> {
        let adapters = self.adapters().await?;
        let peripheral = find_peripheral(&adapters, id).await?;

        if peripheral.is_connected().await? {
            // bonded and in use by the active session
            return Ok(true);
        }

        // the platform bonds on first connect if the module requires it
        match open_serial(&peripheral, &self.config).await {
            Ok(_) => {
                peripheral.disconnect().await?;
                Ok(true)
            },
            Err(LinkError::MissingCharacteristic) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn connect(&self, id: &str) -> Result<(), LinkError> {
        let mut session = self.session.lock().await;
        self.close_session(&mut session).await?;

        let adapters = self.adapters().await?;
        let peripheral = find_peripheral(&adapters, id).await?;
        let serial_char = open_serial(&peripheral, &self.config).await?;

        info!("Peripheral {} ready", id);
        *lock_std(&self.session_id) = Some(peripheral.id());
        *session = Some(Session { peripheral, serial_char });
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        let mut session = self.session.lock().await;
        self.close_session(&mut session).await
    }

    async fn write(&self, payload: &[u8]) -> Result<(), LinkError> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(LinkError::NotConnected)?;

        session.peripheral.write(&session.serial_char, payload, self.write_type()).await?;
        Ok(())
    }

    async fn events(&self) -> Result<BoxStream<'static, LinkEvent>, LinkError> {
        let adapters = self.adapters().await?;
        let mut streams = Vec::with_capacity(adapters.len());

        for adapter in adapters {
            let events = adapter.events().await?;
            streams.push(events.map(move |event| (adapter.clone(), event)).boxed());
        }

        let session_id = self.session_id.clone();
        let known = self.known.clone();
        let service = self.config.service_uuid;

        Ok(stream::select_all(streams)
            .filter_map(move |(adapter, event)| translate_event(adapter, event, session_id.clone(), known.clone(), service))
            .boxed())
    }
}
