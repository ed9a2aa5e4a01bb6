//! Configuration types for the print client.

use std::time::Duration;

/// TSC Auto ID Technology USB vendor id.
pub const TSC_VENDOR_ID: u16 = 0x1203;

/// Session configuration: timeouts plus per-transport settings.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Connection and I/O timeouts.
    pub timeouts: SessionTimeouts,
    /// Default discovery window.
    pub discovery_timeout: Duration,
    /// How often a reader thread wakes to notice a local disconnect on
    /// transports that cannot be interrupted.
    pub poll_interval: Duration,
    /// USB vendor id to match during discovery. `None` accepts any device
    /// exposing a printer-class interface.
    pub usb_vendor_id: Option<u16>,
    /// Baud rate for RFCOMM ttys.
    pub serial_baud: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeouts: SessionTimeouts::default(),
            discovery_timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
            usb_vendor_id: Some(TSC_VENDOR_ID),
            serial_baud: 9600,
        }
    }
}

/// Timeout settings for printer sessions.
///
/// - `connect`: 5s, generous for a LAN printer
/// - `write`: 30s, large `BITMAP` payloads can take a while over Bluetooth
/// - `response`: 1000ms, the window a query waits for its reply
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct SessionTimeouts {
    /// Maximum time to establish a TCP connection.
    pub connect: Duration,
    /// Maximum time for one write to complete.
    pub write: Duration,
    /// Maximum time to wait for a reply after sending a query.
    pub response: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            write: Duration::from_secs(30),
            response: Duration::from_millis(1000),
        }
    }
}
