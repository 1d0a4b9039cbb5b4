use std::sync::Arc;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::device::command::MotionCommand;
use crate::device::link::SerialLink;
use crate::device::types::{Device, LinkEvent};
use crate::remote::state::{RemoteState, Tab, Transition};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Initialize,
    ToggleBluetooth(bool),
    StartDiscovery,
    CancelDiscovery,
    /// Connects on the paired tab, pairs on the movement tab.
    PressDevice(Device),
    Pair(Device),
    Connect(Device),
    Disconnect,
    Send(MotionCommand),
    SelectTab(Tab),
}

/// A link call in flight. It owns everything it needs, so it can be spawned while the
/// controller keeps handling input.
pub type Pending = BoxFuture<'static, Transition>;

/// Owns the remote state and the link. Intents are split in two halves: [`Controller::begin`]
/// applies what is known immediately and returns the link call, [`Controller::apply`] takes
/// the settled result.
pub struct Controller {
    link: Arc<dyn SerialLink>,
    state: RemoteState,
    // token of the running scan, with the scan id it belongs to
    discovery: Option<(u64, CancellationToken)>,
}

impl Controller {
    pub fn new(link: Arc<dyn SerialLink>) -> Self {
        Controller {
            link,
            state: RemoteState::default(),
            discovery: None,
        }
    }

    pub fn state(&self) -> &RemoteState {
        &self.state
    }

    pub fn link(&self) -> Arc<dyn SerialLink> {
        self.link.clone()
    }

    /// Run an intent to completion.
    pub async fn dispatch(&mut self, intent: Intent) {
        if let Some(pending) = self.begin(intent) {
            let transition = pending.await;
            self.apply(transition);
        }
    }

    pub fn begin(&mut self, intent: Intent) -> Option<Pending> {
        match intent {
            Intent::Initialize => Some(self.initialize()),
            Intent::ToggleBluetooth(enable) => Some(self.toggle_bluetooth(enable)),
            Intent::StartDiscovery => self.start_discovery(),
            Intent::CancelDiscovery => self.cancel_discovery(),
            Intent::PressDevice(device) => match self.state.tab {
                Tab::PairedDevices => Some(self.connect(device)),
                Tab::Movement => Some(self.pair(device)),
            },
            Intent::Pair(device) => Some(self.pair(device)),
            Intent::Connect(device) => Some(self.connect(device)),
            Intent::Disconnect => Some(self.disconnect()),
            Intent::Send(command) => Some(self.send(command)),
            Intent::SelectTab(tab) => {
                self.apply(Transition::TabSelected(tab));
                None
            },
        }
    }

    pub fn apply(&mut self, transition: Transition) {
        match &transition {
            Transition::DiscoveryFinished { scan, .. } | Transition::DiscoveryCancelled { scan } => {
                match self.discovery.take() {
                    Some((id, token)) if id == *scan => token.cancel(),
                    other => {
                        debug!("Ignoring outcome of superseded scan {}", scan);
                        self.discovery = other;
                    },
                }
            },
            _ => {},
        }

        let state = std::mem::take(&mut self.state);
        self.state = state.apply(transition);
    }

    pub fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::AdapterEnabled => info!("Bluetooth enabled"),
            LinkEvent::AdapterDisabled => info!("Bluetooth disabled"),
            LinkEvent::Error(message) => error!("Error: {}", message),
            LinkEvent::ConnectionLost => {
                if let Some(device) = &self.state.device {
                    warn!("Connection to device {} has been lost", device.name);
                }
                self.apply(Transition::Disconnected);
            },
            LinkEvent::DeviceDiscovered(device) => {
                info!("Discovered device {}", device);
                self.apply(Transition::DeviceDiscovered(device));
            },
        }
    }

    /// Stops a running scan without waiting for the link.
    pub fn shutdown(&mut self) {
        if let Some((_, token)) = self.discovery.take() {
            token.cancel();
        }
    }

    fn initialize(&self) -> Pending {
        let link = self.link.clone();

        async move {
            let (enabled, paired) = futures::join!(link.is_enabled(), link.list_paired());

            let enabled = enabled
                .map_err(|err| error!("Failed to query bluetooth state: {}", err))
                .ok();
            let paired = paired
                .map_err(|err| error!("Failed to list paired devices: {}", err))
                .ok();

            Transition::Initialized { enabled, paired }
        }.boxed()
    }

    fn toggle_bluetooth(&self, enable: bool) -> Pending {
        let link = self.link.clone();

        async move {
            let result = if enable { link.enable().await } else { link.disable().await };

            match result {
                Ok(()) => Transition::EnabledChanged(enable),
                Err(err) => {
                    warn!("{}", err);
                    Transition::Unchanged
                },
            }
        }.boxed()
    }

    fn start_discovery(&mut self) -> Option<Pending> {
        if self.state.discovering {
            return None;
        }

        self.apply(Transition::DiscoveryStarted);
        let scan = self.state.scan;
        let cancel = CancellationToken::new();
        self.discovery = Some((scan, cancel.clone()));

        let link = self.link.clone();
        Some(async move {
            let devices = match link.discover(cancel).await {
                Ok(devices) => {
                    info!("Discovery finished with {} devices", devices.len());
                    Some(devices)
                },
                Err(err) => {
                    warn!("{}", err);
                    None
                },
            };
            Transition::DiscoveryFinished { scan, devices }
        }.boxed())
    }

    fn cancel_discovery(&self) -> Option<Pending> {
        if !self.state.discovering {
            return None;
        }

        let scan = self.state.scan;
        let link = self.link.clone();
        Some(async move {
            match link.cancel_discovery().await {
                Ok(()) => Transition::DiscoveryCancelled { scan },
                Err(err) => {
                    warn!("{}", err);
                    Transition::Unchanged
                },
            }
        }.boxed())
    }

    fn pair(&self, device: Device) -> Pending {
        let link = self.link.clone();

        async move {
            match link.pair(&device.id).await {
                Ok(true) => {
                    info!("Device {} paired successfully", device.name);
                    Transition::Paired(device)
                },
                Ok(false) => {
                    warn!("Device {} pairing failed", device.name);
                    Transition::Unchanged
                },
                Err(err) => {
                    warn!("{}", err);
                    Transition::Unchanged
                },
            }
        }.boxed()
    }

    fn connect(&mut self, device: Device) -> Pending {
        self.apply(Transition::ConnectStarted);
        let link = self.link.clone();

        async move {
            match link.connect(&device.id).await {
                Ok(()) => {
                    info!("Connected to device {}", device.name);
                    Transition::Connected(device)
                },
                Err(err) => {
                    warn!("{}", err);
                    Transition::ConnectFailed
                },
            }
        }.boxed()
    }

    fn disconnect(&self) -> Pending {
        let link = self.link.clone();

        async move {
            match link.disconnect().await {
                Ok(()) => Transition::Disconnected,
                Err(err) => {
                    warn!("{}", err);
                    Transition::Unchanged
                },
            }
        }.boxed()
    }

    fn send(&self, command: MotionCommand) -> Pending {
        if !self.state.connected {
            // the write is still attempted
            warn!("You must connect to device first");
        }

        let link = self.link.clone();
        async move {
            match link.write(&[command.byte()]).await {
                Ok(()) => {
                    info!("Successfully wrote {} to device", command);
                    Transition::WriteSucceeded
                },
                Err(err) => {
                    warn!("{}", err);
                    Transition::Unchanged
                },
            }
        }.boxed()
    }
}
