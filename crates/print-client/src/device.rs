//! Discovered endpoints.

use std::fmt;

/// The medium a device is reached through.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ConnectionType {
    /// USB bulk transfer.
    Usb,
    /// Bluetooth classic SPP over RFCOMM.
    Bluetooth,
    /// Raw TCP socket.
    Net,
}

impl ConnectionType {
    /// Every connection type.
    pub const ALL: [ConnectionType; 3] = [
        ConnectionType::Usb,
        ConnectionType::Bluetooth,
        ConnectionType::Net,
    ];

    /// Upper-case tag used in logs and serialized devices.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Usb => "USB",
            ConnectionType::Bluetooth => "BLUETOOTH",
            ConnectionType::Net => "NET",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A printer found by discovery, or described by the caller.
///
/// `target` is transport-specific: a USB device path, a Bluetooth MAC, or
/// `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    /// Display name; may be empty.
    pub name: String,
    /// Address handed to `connect`.
    pub target: String,
    /// Transport the target belongs to.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ConnectionType,
}

impl Device {
    /// Describe a device by hand.
    pub fn new(kind: ConnectionType, target: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
        }
    }

    /// A network printer at `host:port`.
    pub fn net(target: impl Into<String>) -> Self {
        Self::new(ConnectionType::Net, target, String::new())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} {}", self.kind, self.target)
        } else {
            write!(f, "{} {} ({})", self.kind, self.target, self.name)
        }
    }
}
