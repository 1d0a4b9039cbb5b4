use std::fmt;

/// A remote Bluetooth device as reported by the link. The application never builds or
/// validates these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Device { id: id.into(), name: name.into() }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    AdapterEnabled,
    AdapterDisabled,
    Error(String),
    ConnectionLost,
    DeviceDiscovered(Device),
}
