use crate::device::types::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Pressing a device connects to it.
    #[default]
    PairedDevices,
    /// Pressing a device pairs with it; the motion pad drives the vehicle.
    Movement,
}

/// Everything the remote shows. Only [`RemoteState::apply`] changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteState {
    /// The bluetooth adapter is on.
    pub enabled: bool,
    /// A scan is running; the movement tab shows the discovery indicator.
    pub discovering: bool,
    /// Set by a successful connect or write, cleared by a disconnect or a lost connection.
    pub connected: bool,
    /// A connect call is in flight.
    pub connecting: bool,
    pub paired: Vec<Device>,
    /// Devices found by the latest scan.
    pub discovered: Vec<Device>,
    /// The device of the current or most recent session. Kept after a disconnect.
    pub device: Option<Device>,
    pub tab: Tab,
    /// Id of the latest scan. Outcomes carrying an older id are ignored.
    pub scan: u64,
}

/// A settled outcome, either of a link call or of a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// `None` where the corresponding query failed.
    Initialized {
        enabled: Option<bool>,
        paired: Option<Vec<Device>>,
    },
    EnabledChanged(bool),
    DiscoveryStarted,
    DeviceDiscovered(Device),
    /// `devices` is `None` if discovery failed.
    DiscoveryFinished {
        scan: u64,
        devices: Option<Vec<Device>>,
    },
    DiscoveryCancelled {
        scan: u64,
    },
    Paired(Device),
    ConnectStarted,
    Connected(Device),
    ConnectFailed,
    Disconnected,
    WriteSucceeded,
    TabSelected(Tab),
    Unchanged,
}

impl RemoteState {
    /// Devices listed under the current tab.
    pub fn visible_devices(&self) -> &[Device] {
        match self.tab {
            Tab::PairedDevices => &self.paired,
            Tab::Movement => &self.discovered,
        }
    }

    pub fn is_active_device(&self, device: &Device) -> bool {
        self.connected && self.device.as_ref().is_some_and(|d| d.id == device.id)
    }

    pub fn apply(mut self, transition: Transition) -> RemoteState {
        match transition {
            Transition::Initialized { enabled, paired } => {
                if let Some(enabled) = enabled {
                    self.enabled = enabled;
                }
                if let Some(paired) = paired {
                    self.paired = paired;
                }
            },
            Transition::EnabledChanged(enabled) => {
                self.enabled = enabled;
            },
            Transition::DiscoveryStarted => {
                self.scan += 1;
                self.discovering = true;
                self.discovered.clear();
            },
            Transition::DeviceDiscovered(device) => {
                // late events from a finished scan are dropped
                if self.discovering {
                    self.discovered.push(device);
                }
            },
            Transition::DiscoveryFinished { scan, devices } => {
                if scan != self.scan {
                    return self;
                }
                self.discovering = false;
                if let Some(devices) = devices {
                    self.discovered = devices;
                }
            },
            Transition::DiscoveryCancelled { scan } => {
                if scan == self.scan {
                    self.discovering = false;
                }
            },
            Transition::Paired(device) => {
                // no check against an existing entry with the same id
                self.discovered.retain(|d| d.id != device.id);
                self.paired.push(device);
            },
            Transition::ConnectStarted => {
                self.connecting = true;
            },
            Transition::Connected(device) => {
                self.device = Some(device);
                self.connected = true;
                self.connecting = false;
            },
            Transition::ConnectFailed => {
                self.connecting = false;
            },
            Transition::Disconnected => {
                self.connected = false;
            },
            Transition::WriteSucceeded => {
                self.connected = true;
            },
            Transition::TabSelected(tab) => {
                self.tab = tab;
            },
            Transition::Unchanged => {},
        }

        self
    }
}
