use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::stream::{BoxStream, StreamExt};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::device::link::SerialLink;
use crate::device::scan::ScanSlot;
use crate::device::types::{Device, LinkEvent};
use crate::error::LinkError;

/// Operations of [`SerialLink`] that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IsEnabled,
    ListPaired,
    Enable,
    Disable,
    Discover,
    CancelDiscovery,
    Pair,
    Connect,
    Disconnect,
    Write,
}

/// A call received by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    IsEnabled,
    ListPaired,
    Enable,
    Disable,
    Discover,
    CancelDiscovery,
    Pair(String),
    Connect(String),
    Disconnect,
    Write(Vec<u8>),
}

#[derive(Default)]
struct FakeInner {
    enabled: bool,
    paired: Vec<Device>,
    nearby: Vec<Device>,
    refuse_pairing: HashSet<String>,
    failing: HashSet<Operation>,
    hold_discovery: bool,
    discovery: ScanSlot,
    connected: Option<String>,
    wire: Vec<u8>,
    calls: Vec<LinkCall>,
    subscribers: Vec<UnboundedSender<LinkEvent>>,
}

/// In-memory [`SerialLink`]. Records every call and every byte that reached a connected
/// device; any operation can be made to fail.
#[derive(Clone, Default)]
pub struct FakeSerial {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeSerial {
    pub fn new() -> Self {
        FakeSerial::default()
    }

    /// An enabled adapter with one bonded vehicle and two devices in range.
    pub fn demo() -> Self {
        FakeSerial::new()
            .with_enabled(true)
            .with_paired(vec![Device::new("98:D3:31:F5:8A:01", "RC Car")])
            .with_nearby(vec![
                Device::new("00:14:03:05:0C:7E", "HC-05"),
                Device::new("F0:C7:7F:94:11:2B", "Robot Arm"),
            ])
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        self.lock().enabled = enabled;
        self
    }

    pub fn with_paired(self, devices: Vec<Device>) -> Self {
        self.lock().paired = devices;
        self
    }

    /// Devices returned by discovery.
    pub fn with_nearby(self, devices: Vec<Device>) -> Self {
        self.lock().nearby = devices;
        self
    }

    /// Keep `discover` running until its token is cancelled.
    pub fn with_held_discovery(self) -> Self {
        self.lock().hold_discovery = true;
        self
    }

    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    pub fn refuse_pairing(&self, id: &str) {
        self.lock().refuse_pairing.insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Bytes delivered to a connected device.
    pub fn wire(&self) -> Vec<u8> {
        self.lock().wire.clone()
    }

    pub fn connected_to(&self) -> Option<String> {
        self.lock().connected.clone()
    }

    pub fn emit(&self, event: LinkEvent) {
        let mut inner = self.lock();
        inner.subscribers.retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    /// Drop the session as if the remote end went away.
    pub fn lose_connection(&self) {
        self.lock().connected = None;
        self.emit(LinkEvent::ConnectionLost);
    }

    fn lock(&self) -> MutexGuard<'_, FakeInner> {
        // a panic while holding the lock can only come from a failing test
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: LinkCall, operation: Operation) -> Result<(), LinkError> {
        let mut inner = self.lock();
        debug!("fake link call {:?}", call);
        inner.calls.push(call);

        if inner.failing.contains(&operation) {
            return Err(LinkError::Failed(format!("{:?} failed", operation)));
        }
        Ok(())
    }

    fn find_device(&self, id: &str) -> Option<Device> {
        let inner = self.lock();
        inner.paired.iter()
            .chain(inner.nearby.iter())
            .find(|device| device.id == id)
            .cloned()
    }
}

#[async_trait]
impl SerialLink for FakeSerial {
    async fn is_enabled(&self) -> Result<bool, LinkError> {
        self.record(LinkCall::IsEnabled, Operation::IsEnabled)?;
        Ok(self.lock().enabled)
    }

    async fn list_paired(&self) -> Result<Vec<Device>, LinkError> {
        self.record(LinkCall::ListPaired, Operation::ListPaired)?;
        Ok(self.lock().paired.clone())
    }

    async fn enable(&self) -> Result<(), LinkError> {
        self.record(LinkCall::Enable, Operation::Enable)?;
        self.lock().enabled = true;
        self.emit(LinkEvent::AdapterEnabled);
        Ok(())
    }

    async fn disable(&self) -> Result<(), LinkError> {
        self.record(LinkCall::Disable, Operation::Disable)?;
        {
            let mut inner = self.lock();
            inner.enabled = false;
            inner.connected = None;
        }
        self.emit(LinkEvent::AdapterDisabled);
        Ok(())
    }

    async fn discover(&self, cancel: CancellationToken) -> Result<Vec<Device>, LinkError> {
        self.record(LinkCall::Discover, Operation::Discover)?;

        let (scan, nearby, hold) = {
            let mut inner = self.lock();
            let scan = inner.discovery.begin(cancel.clone());
            (scan, inner.nearby.clone(), inner.hold_discovery)
        };

        for device in &nearby {
            self.emit(LinkEvent::DeviceDiscovered(device.clone()));
        }

        if hold {
            cancel.cancelled().await;
        }

        self.lock().discovery.finish(scan);
        Ok(nearby)
    }

    async fn cancel_discovery(&self) -> Result<(), LinkError> {
        self.record(LinkCall::CancelDiscovery, Operation::CancelDiscovery)?;
        self.lock().discovery.cancel();
        Ok(())
    }

    async fn pair(&self, id: &str) -> Result<bool, LinkError> {
        self.record(LinkCall::Pair(id.to_string()), Operation::Pair)?;

        let device = self.find_device(id).ok_or_else(|| LinkError::UnknownDevice(id.to_string()))?;
        let mut inner = self.lock();
        if inner.refuse_pairing.contains(id) {
            return Ok(false);
        }

        inner.nearby.retain(|d| d.id != id);
        inner.paired.push(device);
        Ok(true)
    }

    async fn connect(&self, id: &str) -> Result<(), LinkError> {
        self.record(LinkCall::Connect(id.to_string()), Operation::Connect)?;

        let device = self.find_device(id).ok_or_else(|| LinkError::UnknownDevice(id.to_string()))?;
        self.lock().connected = Some(device.id);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        self.record(LinkCall::Disconnect, Operation::Disconnect)?;
        self.lock().connected = None;
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<(), LinkError> {
        self.record(LinkCall::Write(payload.to_vec()), Operation::Write)?;

        let mut inner = self.lock();
        if inner.connected.is_none() {
            return Err(LinkError::NotConnected);
        }
        inner.wire.extend_from_slice(payload);
        Ok(())
    }

    async fn events(&self) -> Result<BoxStream<'static, LinkEvent>, LinkError> {
        let (tx, rx) = unbounded();
        self.lock().subscribers.push(tx);
        Ok(rx.boxed())
    }
}
