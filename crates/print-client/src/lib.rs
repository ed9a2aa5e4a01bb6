//! TSPL Print Client: talk to TSC-style label printers.
//!
//! Supports TCP (port 9100), USB bulk (feature `usb`), and Bluetooth RFCOMM
//! (feature `bluetooth`) transports. The API is synchronous (`std::net` and
//! plain threads), with no async runtime required.
//!
//! ```no_run
//! use tspl_print_client::{Device, PrinterSession, SessionConfig};
//! use tspl_core::TextOptions;
//!
//! let mut session = PrinterSession::new(SessionConfig::default());
//! session.connect(&Device::net("192.168.1.50"))?;
//! session.set_size(50, 30)?;
//! session.clear_buffer()?;
//! session.add_text(10, 10, "Hello", &TextOptions::default())?;
//! session.print(1, 1)?;
//! println!("{}", session.get_status()?);
//! # Ok::<(), tspl_print_client::PrintError>(())
//! ```

mod addr;
mod arena;
mod config;
mod connection;
mod device;
mod error;
mod event;
mod session;
mod task;
mod transport;

pub use addr::{DEFAULT_PORT, resolve_printer_addr};
pub use arena::SessionArena;
pub use config::{SessionConfig, SessionTimeouts, TSC_VENDOR_ID};
pub use connection::{Connection, DisconnectHandle};
pub use device::{ConnectionType, Device};
pub use error::PrintError;
pub use event::{EventKind, SessionHandle, TransportEvent};
pub use session::{PrinterSession, SessionState};
pub use task::{Task, spawn_connect, spawn_discover};
pub use transport::discover;
