//! Bluetooth SPP transport over a bound RFCOMM tty, using `serialport`.
//!
//! Feature-gated behind `bluetooth`. Pairing and `rfcomm bind` happen
//! outside this crate; a MAC target is resolved to its `/dev/rfcommN` tty,
//! which is then driven like any serial port.

use std::fs;
use std::io;

use tracing::debug;

use super::rfcomm::{self, RfcommBinding};
use super::{Link, LinkCloser, LinkReader, LinkWriter};
use crate::{ConnectionType, Device, PrintError, SessionConfig};

const RFCOMM_TABLE: &str = "/proc/net/rfcomm";

fn bindings() -> Result<Vec<RfcommBinding>, PrintError> {
    let contents = fs::read_to_string(RFCOMM_TABLE).map_err(|e| PrintError::NotAvailable {
        transport: "bluetooth",
        reason: format!("{RFCOMM_TABLE}: {e}"),
    })?;
    Ok(rfcomm::parse_bindings(&contents))
}

/// List printers bound to an RFCOMM tty.
pub(crate) fn discover() -> Result<Vec<Device>, PrintError> {
    Ok(bindings()?
        .into_iter()
        .map(|b| Device::new(ConnectionType::Bluetooth, b.remote, b.name))
        .collect())
}

/// Open the tty bound to the MAC `target`.
pub(crate) fn open(target: &str, config: &SessionConfig) -> Result<Link, PrintError> {
    if !rfcomm::is_valid_mac(target) {
        return Err(PrintError::InvalidAddress(format!(
            "{target:?} is not a Bluetooth MAC address"
        )));
    }
    let bindings = bindings()?;
    let binding = rfcomm::find_binding(&bindings, target).ok_or_else(|| PrintError::NotFound {
        target: target.to_string(),
    })?;
    let path = binding.tty_path();
    debug!(target, %path, "opening rfcomm tty");

    let writer = serialport::new(&path, config.serial_baud)
        .timeout(config.timeouts.write)
        .open()
        .map_err(|e| open_error(target, e))?;
    let mut reader = writer.try_clone().map_err(|e| open_error(target, e))?;
    reader
        .set_timeout(config.poll_interval)
        .map_err(|e| open_error(target, e))?;

    Ok(Link {
        reader: LinkReader::Bluetooth(reader),
        writer: LinkWriter::Bluetooth(writer),
        closer: LinkCloser::Passive,
    })
}

fn open_error(target: &str, e: serialport::Error) -> PrintError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => PrintError::NotFound {
            target: target.to_string(),
        },
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
            PrintError::PermissionDenied {
                target: target.to_string(),
            }
        }
        _ => PrintError::ConnectFailed {
            target: target.to_string(),
            source: io::Error::other(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_mac_target_is_invalid_address() {
        assert!(matches!(
            open("/dev/rfcomm0", &SessionConfig::default()),
            Err(PrintError::InvalidAddress(_))
        ));
    }

    #[test]
    fn serial_errors_map_to_taxonomy() {
        let err = open_error(
            "00:11:22:33:44:55",
            serialport::Error::new(serialport::ErrorKind::NoDevice, "gone"),
        );
        assert!(matches!(err, PrintError::NotFound { .. }));

        let err = open_error(
            "00:11:22:33:44:55",
            serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "denied",
            ),
        );
        assert!(matches!(err, PrintError::PermissionDenied { .. }));
    }
}
