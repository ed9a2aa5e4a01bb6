//! The closed set of media a printer is reached through.
//!
//! Every transport produces the same [`Link`]: a reader the pump thread
//! drains, a writer the session sends through, and a closer that can be
//! triggered from any thread. A reader either fails as soon as its closer
//! fires (TCP, USB) or returns `TimedOut`/`WouldBlock` within the configured
//! poll interval so the pump can check the closed flag (Bluetooth).

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::{ConnectionType, Device, PrintError, SessionConfig};

#[cfg(feature = "bluetooth")]
pub(crate) mod bluetooth;
#[cfg(any(feature = "bluetooth", test))]
pub(crate) mod rfcomm;
pub(crate) mod tcp;
#[cfg(feature = "usb")]
pub(crate) mod usb;

/// An open channel, split for concurrent reading and writing.
pub(crate) struct Link {
    pub(crate) reader: LinkReader,
    pub(crate) writer: LinkWriter,
    pub(crate) closer: LinkCloser,
}

/// Receiving half of a link.
pub(crate) enum LinkReader {
    Net(TcpStream),
    #[cfg(feature = "usb")]
    Usb(usb::BulkReader),
    #[cfg(feature = "bluetooth")]
    Bluetooth(Box<dyn serialport::SerialPort>),
}

impl Read for LinkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LinkReader::Net(stream) => stream.read(buf),
            #[cfg(feature = "usb")]
            LinkReader::Usb(reader) => reader.read(buf),
            #[cfg(feature = "bluetooth")]
            LinkReader::Bluetooth(port) => port.read(buf),
        }
    }
}

/// Sending half of a link.
pub(crate) enum LinkWriter {
    Net(TcpStream),
    #[cfg(feature = "usb")]
    Usb(usb::BulkWriter),
    #[cfg(feature = "bluetooth")]
    Bluetooth(Box<dyn serialport::SerialPort>),
}

impl Write for LinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LinkWriter::Net(stream) => stream.write(buf),
            #[cfg(feature = "usb")]
            LinkWriter::Usb(writer) => writer.write(buf),
            #[cfg(feature = "bluetooth")]
            LinkWriter::Bluetooth(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LinkWriter::Net(stream) => stream.flush(),
            #[cfg(feature = "usb")]
            LinkWriter::Usb(writer) => writer.flush(),
            #[cfg(feature = "bluetooth")]
            LinkWriter::Bluetooth(port) => port.flush(),
        }
    }
}

/// Wakes a blocked reader, where the medium allows it.
pub(crate) enum LinkCloser {
    /// Shutting the socket down fails any pending read immediately.
    Net(TcpStream),
    /// Closing cancels the bulk IN transfer in flight.
    #[cfg(feature = "usb")]
    Usb(usb::UsbCloser),
    /// The reader notices the closed flag at its next poll.
    #[cfg_attr(not(feature = "bluetooth"), allow(dead_code))]
    Passive,
}

impl LinkCloser {
    pub(crate) fn close(&self) {
        match self {
            LinkCloser::Net(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            #[cfg(feature = "usb")]
            LinkCloser::Usb(closer) => closer.close(),
            LinkCloser::Passive => {}
        }
    }
}

/// Whether a read error only means "nothing yet".
pub(crate) fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// List reachable devices of one kind.
///
/// The call returns after at most `timeout`; an enumeration still running
/// at that point is abandoned and reported as no devices. Network discovery
/// is [`PrintError::Unsupported`]: connect to a known `host:port` instead.
pub fn discover(
    kind: ConnectionType,
    timeout: Duration,
    config: &SessionConfig,
) -> Result<Vec<Device>, PrintError> {
    let (tx, rx) = mpsc::channel();
    let config = config.clone();
    thread::Builder::new()
        .name(format!("tspl-discover-{}", kind.as_str().to_lowercase()))
        .spawn(move || {
            let _ = tx.send(discover_now(kind, &config));
        })
        .map_err(|e| PrintError::NotAvailable {
            transport: kind.as_str(),
            reason: format!("cannot spawn discovery thread: {e}"),
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            if let Ok(devices) = &result {
                debug!(%kind, found = devices.len(), "discovery finished");
            }
            result
        }
        Err(_) => {
            debug!(%kind, ?timeout, "discovery window elapsed");
            Ok(Vec::new())
        }
    }
}

#[cfg_attr(not(feature = "usb"), allow(unused_variables))]
fn discover_now(kind: ConnectionType, config: &SessionConfig) -> Result<Vec<Device>, PrintError> {
    match kind {
        ConnectionType::Net => Err(PrintError::Unsupported(
            "network printers cannot be discovered; connect to host:port".into(),
        )),
        #[cfg(feature = "usb")]
        ConnectionType::Usb => usb::discover(config),
        #[cfg(feature = "bluetooth")]
        ConnectionType::Bluetooth => bluetooth::discover(),
        #[allow(unreachable_patterns)]
        other => Err(not_compiled(other)),
    }
}

/// Open a link to `device`.
pub(crate) fn open(device: &Device, config: &SessionConfig) -> Result<Link, PrintError> {
    match device.kind {
        ConnectionType::Net => tcp::open(&device.target, config),
        #[cfg(feature = "usb")]
        ConnectionType::Usb => usb::open(&device.target),
        #[cfg(feature = "bluetooth")]
        ConnectionType::Bluetooth => bluetooth::open(&device.target, config),
        #[allow(unreachable_patterns)]
        other => Err(not_compiled(other)),
    }
}

#[cfg_attr(all(feature = "usb", feature = "bluetooth"), allow(dead_code))]
fn not_compiled(kind: ConnectionType) -> PrintError {
    PrintError::Unsupported(format!(
        "{kind} transport is not compiled in (enable the `{}` feature)",
        kind.as_str().to_lowercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_discovery_is_unsupported() {
        let result = discover(
            ConnectionType::Net,
            Duration::from_secs(1),
            &SessionConfig::default(),
        );
        assert!(matches!(result, Err(PrintError::Unsupported(_))));
    }

    #[cfg(not(feature = "usb"))]
    #[test]
    fn disabled_transport_is_unsupported() {
        let device = Device::new(ConnectionType::Usb, "/dev/bus/usb/001/002", "");
        assert!(matches!(
            open(&device, &SessionConfig::default()),
            Err(PrintError::Unsupported(_))
        ));
    }

    #[test]
    fn idle_errors() {
        assert!(is_idle(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(is_idle(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_idle(&io::Error::from(io::ErrorKind::ConnectionReset)));
    }
}
