//! USB bulk transport using the `nusb` crate.
//!
//! Feature-gated behind `usb`. TSC printers expose a USB Printer class
//! (bInterfaceClass = 7) interface with a bulk OUT endpoint for commands and
//! a bulk IN endpoint for replies.

use std::future::Future;
use std::io;

use async_channel::{Receiver, Sender};
use futures_lite::future::{self, block_on};
use nusb::transfer::{Direction, EndpointType, RequestBuffer, TransferError};
use tracing::debug;

use super::{Link, LinkCloser, LinkReader, LinkWriter};
use crate::{ConnectionType, Device, PrintError, SessionConfig};

/// USB Printer class code (bInterfaceClass).
const USB_CLASS_PRINTER: u8 = 7;

/// Bytes requested per bulk IN transfer.
const READ_CHUNK: usize = 512;

/// List attached printers.
pub(crate) fn discover(config: &SessionConfig) -> Result<Vec<Device>, PrintError> {
    let devices = nusb::list_devices().map_err(|e| PrintError::NotAvailable {
        transport: "usb",
        reason: e.to_string(),
    })?;

    Ok(devices
        .filter(|dev| matches_filter(dev, config))
        .map(|dev| {
            Device::new(
                ConnectionType::Usb,
                device_path(&dev),
                dev.product_string().unwrap_or_default(),
            )
        })
        .collect())
}

/// Open the printer whose path is `target`.
pub(crate) fn open(target: &str) -> Result<Link, PrintError> {
    let devices = nusb::list_devices().map_err(|e| PrintError::NotAvailable {
        transport: "usb",
        reason: e.to_string(),
    })?;

    let dev_info = devices
        .into_iter()
        .find(|dev| device_path(dev) == target)
        .ok_or_else(|| PrintError::NotFound {
            target: target.to_string(),
        })?;

    let interface_number = printer_interface(&dev_info).ok_or_else(|| PrintError::NotFound {
        target: format!("{target} (no printer-class interface)"),
    })?;

    let device = dev_info.open().map_err(|e| open_error(target, e))?;
    let (ep_out, ep_in) = discover_endpoints(&device, interface_number, target)?;

    // On Linux the `usblp` kernel driver may hold the interface.
    let interface = device
        .detach_and_claim_interface(interface_number)
        .map_err(|e| open_error(target, e))?;
    debug!(target, interface_number, ep_out, ?ep_in, "claimed usb interface");

    let (cancel_tx, cancel_rx) = async_channel::bounded(1);
    Ok(Link {
        reader: LinkReader::Usb(BulkReader {
            interface: interface.clone(),
            ep_in,
            cancel: cancel_rx,
            buffer: Vec::new(),
            pos: 0,
        }),
        writer: LinkWriter::Usb(BulkWriter { interface, ep_out }),
        closer: LinkCloser::Usb(UsbCloser(cancel_tx)),
    })
}

fn matches_filter(dev: &nusb::DeviceInfo, config: &SessionConfig) -> bool {
    let vendor_ok = config
        .usb_vendor_id
        .is_none_or(|vid| dev.vendor_id() == vid);
    vendor_ok && printer_interface(dev).is_some()
}

fn printer_interface(dev: &nusb::DeviceInfo) -> Option<u8> {
    dev.interfaces()
        .find(|iface| iface.class() == USB_CLASS_PRINTER)
        .map(|iface| iface.interface_number())
}

/// Stable path identifying a device while it stays plugged in.
#[cfg(target_os = "linux")]
fn device_path(dev: &nusb::DeviceInfo) -> String {
    format!(
        "/dev/bus/usb/{:03}/{:03}",
        dev.busnum(),
        dev.device_address()
    )
}

#[cfg(not(target_os = "linux"))]
fn device_path(dev: &nusb::DeviceInfo) -> String {
    format!(
        "usb:{:04x}:{:04x}:{:03}",
        dev.vendor_id(),
        dev.product_id(),
        dev.device_address()
    )
}

fn open_error(target: &str, e: io::Error) -> PrintError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => PrintError::PermissionDenied {
            target: target.to_string(),
        },
        io::ErrorKind::NotFound => PrintError::NotFound {
            target: target.to_string(),
        },
        _ => PrintError::ConnectFailed {
            target: target.to_string(),
            source: e,
        },
    }
}

/// Walk the active configuration to find the bulk OUT and optional bulk IN
/// endpoints of the printer interface.
fn discover_endpoints(
    device: &nusb::Device,
    interface_number: u8,
    target: &str,
) -> Result<(u8, Option<u8>), PrintError> {
    let config = device
        .active_configuration()
        .map_err(|e| PrintError::ConnectFailed {
            target: target.to_string(),
            source: io::Error::other(format!("failed to read active configuration: {e}")),
        })?;

    let mut ep_out = None;
    let mut ep_in = None;

    for alt_setting in config.interface_alt_settings() {
        if alt_setting.interface_number() != interface_number
            || alt_setting.alternate_setting() != 0
        {
            continue;
        }
        for ep in alt_setting.endpoints() {
            if ep.transfer_type() != EndpointType::Bulk {
                continue;
            }
            match ep.direction() {
                Direction::Out => {
                    ep_out.get_or_insert(ep.address());
                }
                Direction::In => {
                    ep_in.get_or_insert(ep.address());
                }
            }
        }
        break;
    }

    let ep_out = ep_out.ok_or_else(|| PrintError::ConnectFailed {
        target: target.to_string(),
        source: io::Error::other("no bulk OUT endpoint on printer interface"),
    })?;
    Ok((ep_out, ep_in))
}

fn transfer_error(e: TransferError) -> io::Error {
    match e {
        TransferError::Disconnected => io::Error::new(io::ErrorKind::NotConnected, e),
        other => io::Error::other(other),
    }
}

/// Bulk OUT side of a claimed interface.
pub(crate) struct BulkWriter {
    interface: nusb::Interface,
    ep_out: u8,
}

impl io::Write for BulkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let completion = block_on(self.interface.bulk_out(self.ep_out, buf.to_vec()));
        completion.status.map_err(transfer_error)?;
        Ok(completion.data.actual_length())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Bulk IN side of a claimed interface, as a blocking `io::Read`.
///
/// A read waits for the next transfer to complete. Closing the paired
/// [`UsbCloser`] cancels the transfer in flight and the read fails with
/// `ConnectionAborted`.
pub(crate) struct BulkReader {
    interface: nusb::Interface,
    ep_in: Option<u8>,
    cancel: Receiver<()>,
    buffer: Vec<u8>,
    pos: usize,
}

impl io::Read for BulkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let available = &self.buffer[self.pos..];
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.pos += n;
            return Ok(n);
        }

        let Some(ep_in) = self.ep_in else {
            // Write-only printer: nothing will ever arrive.
            let _ = block_on(self.cancel.recv());
            return Err(io::ErrorKind::ConnectionAborted.into());
        };

        let transfer = self.interface.bulk_in(ep_in, RequestBuffer::new(READ_CHUNK));
        let Some(completion) = until_cancelled(transfer, &self.cancel) else {
            return Err(io::ErrorKind::ConnectionAborted.into());
        };
        completion.status.map_err(transfer_error)?;

        let data = completion.data;
        if data.is_empty() {
            // A zero-length packet is not end-of-stream.
            return Err(io::ErrorKind::TimedOut.into());
        }
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        self.buffer = data;
        self.pos = n;
        Ok(n)
    }
}

/// Cancels the pending bulk IN transfer of a [`BulkReader`].
pub(crate) struct UsbCloser(Sender<()>);

impl UsbCloser {
    pub(crate) fn close(&self) {
        self.0.close();
    }
}

/// Drive `work` to completion unless `cancel` closes first. Dropping an
/// unfinished transfer future cancels the transfer.
fn until_cancelled<F: Future>(work: F, cancel: &Receiver<()>) -> Option<F::Output> {
    block_on(future::or(async { Some(work.await) }, async {
        let _ = cancel.recv().await;
        None
    }))
}
