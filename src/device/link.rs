use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::device::types::{Device, LinkEvent};
use crate::error::LinkError;

/// Bluetooth serial capability used by the remote controller.
///
/// Implementations own the radio and the single serial session. They must be
/// `Send + Sync` so the link can be shared as `Arc<dyn SerialLink>` between the UI and the
/// futures it spawns.
#[async_trait]
pub trait SerialLink: Send + Sync {
    /// Whether the Bluetooth adapter is turned on.
    async fn is_enabled(&self) -> Result<bool, LinkError>;

    /// Devices already bonded with the host.
    async fn list_paired(&self) -> Result<Vec<Device>, LinkError>;

    async fn enable(&self) -> Result<(), LinkError>;

    async fn disable(&self) -> Result<(), LinkError>;

    /// Scan for unpaired devices until the scan finishes or `cancel` fires.
    ///
    /// Every device found is also emitted as [`LinkEvent::DeviceDiscovered`] while the scan
    /// is running. The returned list holds everything found, including when cancelled.
    async fn discover(&self, cancel: CancellationToken) -> Result<Vec<Device>, LinkError>;

    async fn cancel_discovery(&self) -> Result<(), LinkError>;

    /// Returns `Ok(false)` when the device refused to pair.
    async fn pair(&self, id: &str) -> Result<bool, LinkError>;

    /// Open the serial session to `id`, replacing any existing session.
    async fn connect(&self, id: &str) -> Result<(), LinkError>;

    async fn disconnect(&self) -> Result<(), LinkError>;

    async fn write(&self, payload: &[u8]) -> Result<(), LinkError>;

    /// Adapter and connection notifications. Each call returns an independent stream.
    async fn events(&self) -> Result<BoxStream<'static, LinkEvent>, LinkError>;
}
