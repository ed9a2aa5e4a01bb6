//! High-level printer session.
//!
//! [`PrinterSession`] wraps at most one [`Connection`] and exposes every
//! printer operation as a typed method. Drawing and configuration calls are
//! fire-and-forget: they succeed once the frame is written. Queries send a
//! request and wait up to [`SessionTimeouts::response`] for the reply.
//!
//! [`SessionTimeouts::response`]: crate::SessionTimeouts::response

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tracing::debug;
use tspl_core::{
    Bitmap, BarcodeOptions, BarcodeType, CodePage, Number, QrOptions, SensorType, Status,
    TextOptions, commands,
};

use crate::connection::Observers;
use crate::task::{self, Task};
use crate::{
    Connection, ConnectionType, Device, DisconnectHandle, PrintError, SessionConfig,
    SessionHandle, TransportEvent,
};

/// Replies to the text queries are short; anything longer is truncated.
const QUERY_REPLY_MAX: usize = 1024;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SessionState {
    /// No channel is open.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A channel is open.
    Connected,
}

/// A printer session over any transport.
pub struct PrinterSession {
    config: SessionConfig,
    state: SessionState,
    connection: Option<Connection>,
    observers: Observers,
}

impl PrinterSession {
    /// A disconnected session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            connection: None,
            observers: Observers::default(),
        }
    }

    /// The configuration this session connects with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    ///
    /// This tracks the local lifecycle only: after the printer hangs up the
    /// state stays `Connected` until [`disconnect`](Self::disconnect).
    /// Use [`is_connected`](Self::is_connected) to see whether the link is
    /// still alive.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a channel is open and the printer has not dropped it.
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
            && self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Handle of the open connection.
    pub fn handle(&self) -> Option<SessionHandle> {
        self.connection.as_ref().map(Connection::handle)
    }

    /// The device the session is connected to.
    pub fn device(&self) -> Option<&Device> {
        self.connection.as_ref().map(Connection::device)
    }

    /// Receive every event of every connection this session opens from now
    /// on. Subscribe before connecting to see `Connected`.
    pub fn subscribe(&self) -> Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// A handle that closes the current connection from another thread.
    pub fn disconnect_handle(&self) -> Option<DisconnectHandle> {
        self.connection.as_ref().map(Connection::disconnect_handle)
    }

    /// Discover printers reachable over `kind` within the configured window.
    pub fn discover(&self, kind: ConnectionType) -> Result<Vec<Device>, PrintError> {
        crate::transport::discover(kind, self.config.discovery_timeout, &self.config)
    }

    /// Open a channel to `device`, closing any current one first.
    ///
    /// On failure the session is left `Disconnected`.
    pub fn connect(&mut self, device: &Device) -> Result<SessionHandle, PrintError> {
        self.disconnect();
        self.state = SessionState::Connecting;
        debug!(%device, "connecting");
        match Connection::open_observed(device, &self.config, Arc::clone(&self.observers)) {
            Ok(connection) => {
                let handle = connection.handle();
                self.connection = Some(connection);
                self.state = SessionState::Connected;
                Ok(handle)
            }
            Err(e) => {
                debug!(%device, error = %e, "connect failed");
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Connect on a background thread. The task yields the session back
    /// once connected; dropping the task drops the session with it.
    pub fn connect_in_background(self, device: Device) -> Task<PrinterSession> {
        task::spawn_connect(self, device)
    }

    /// Close the current channel. Safe to call in any state.
    pub fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.disconnect();
        }
        self.state = SessionState::Disconnected;
    }

    fn connection_mut(&mut self) -> Result<&mut Connection, PrintError> {
        self.connection.as_mut().ok_or(PrintError::SessionClosed)
    }

    // ── Raw I/O ─────────────────────────────────────────────────────────

    /// Write raw bytes.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
        self.connection_mut()?.send(bytes)
    }

    /// Read up to `max_bytes`; empty if nothing arrives within `timeout`.
    pub fn receive(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>, PrintError> {
        self.connection_mut()?.receive(max_bytes, timeout)
    }

    fn query(&mut self, request: &[u8], max_bytes: usize) -> Result<Vec<u8>, PrintError> {
        let timeout = self.config.timeouts.response;
        self.connection_mut()?.query(request, max_bytes, timeout)
    }

    fn query_text(&mut self, request: &[u8]) -> Result<String, PrintError> {
        let reply = self.query(request, QUERY_REPLY_MAX)?;
        let text = String::from_utf8_lossy(&reply);
        Ok(text.trim_end_matches(['\r', '\n', '\0']).to_owned())
    }

    // ── Configuration ───────────────────────────────────────────────────

    /// Label size in millimetres.
    pub fn set_size(
        &mut self,
        width: impl Into<Number>,
        height: impl Into<Number>,
    ) -> Result<(), PrintError> {
        let frame = commands::size(width, height)?;
        self.send_raw(&frame)
    }

    /// Print speed.
    pub fn set_speed(&mut self, speed: impl Into<Number>) -> Result<(), PrintError> {
        let frame = commands::speed(speed)?;
        self.send_raw(&frame)
    }

    /// Print darkness.
    pub fn set_density(&mut self, density: impl Into<Number>) -> Result<(), PrintError> {
        let frame = commands::density(density)?;
        self.send_raw(&frame)
    }

    /// Media sensor type with distance and offset in millimetres.
    pub fn set_sensor(
        &mut self,
        sensor: SensorType,
        distance: impl Into<Number>,
        offset: impl Into<Number>,
    ) -> Result<(), PrintError> {
        let frame = commands::sensor(sensor, distance, offset)?;
        self.send_raw(&frame)
    }

    /// Character set for subsequent text.
    pub fn set_codepage(&mut self, codepage: CodePage) -> Result<(), PrintError> {
        self.send_raw(&commands::codepage(codepage))
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    /// Clear the image buffer.
    pub fn clear_buffer(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::clear_buffer())
    }

    /// Draw a linear barcode.
    pub fn add_barcode(
        &mut self,
        x: u32,
        y: u32,
        kind: BarcodeType,
        content: &str,
        height: u32,
        opts: &BarcodeOptions,
    ) -> Result<(), PrintError> {
        self.send_raw(&commands::barcode(x, y, kind, content, height, opts))
    }

    /// Draw text.
    pub fn add_text(
        &mut self,
        x: u32,
        y: u32,
        content: &str,
        opts: &TextOptions,
    ) -> Result<(), PrintError> {
        self.send_raw(&commands::text(x, y, content, opts))
    }

    /// Draw a QR code.
    pub fn add_qrcode(
        &mut self,
        x: u32,
        y: u32,
        content: &str,
        cell_width: u32,
        opts: &QrOptions,
    ) -> Result<(), PrintError> {
        self.send_raw(&commands::qrcode(x, y, content, cell_width, opts))
    }

    /// Draw a filled rectangle.
    pub fn add_bar(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), PrintError> {
        self.send_raw(&commands::bar(x, y, width, height))
    }

    /// Draw an already-encoded bitmap.
    pub fn add_bitmap(&mut self, x: u32, y: u32, bitmap: &Bitmap) -> Result<(), PrintError> {
        self.send_raw(&commands::bitmap(x, y, bitmap))
    }

    /// Decode PNG/JPEG/BMP/GIF bytes, scale to `height_dots` (0 keeps the
    /// source size) and draw the result.
    ///
    /// Decoding happens before anything is sent; a bad image writes
    /// nothing.
    pub fn add_image(
        &mut self,
        x: u32,
        y: u32,
        image: &[u8],
        height_dots: i32,
    ) -> Result<(), PrintError> {
        let bitmap = tspl_core::encode_image_bytes(image, height_dots)?;
        debug!(
            width = bitmap.width_dots,
            height = bitmap.height_dots,
            "encoded image"
        );
        self.add_bitmap(x, y, &bitmap)
    }

    // ── Motion ──────────────────────────────────────────────────────────

    /// Print `quantity` labels, each repeated `copies` times.
    pub fn print(&mut self, quantity: u32, copies: u32) -> Result<(), PrintError> {
        self.send_raw(&commands::print(quantity, copies))
    }

    /// Print one copy of the current label.
    pub fn print_label(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::print_label())
    }

    /// Advance the media.
    pub fn feed(&mut self, dots: u32) -> Result<(), PrintError> {
        self.send_raw(&commands::feed(dots))
    }

    /// Advance the media by one dot.
    pub fn feed_step(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::feed_step())
    }

    /// Retract the media.
    pub fn backfeed(&mut self, dots: u32) -> Result<(), PrintError> {
        self.send_raw(&commands::backfeed(dots))
    }

    /// Retract the media by one dot.
    pub fn backfeed_step(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::backfeed_step())
    }

    /// Advance to the start of the next label.
    pub fn formfeed(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::formfeed())
    }

    /// Cut the media.
    pub fn cut(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::cut())
    }

    /// Stop feeding the label to the tear bar after printing.
    pub fn tear_off(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::tear_off())
    }

    /// Reboot the printer.
    pub fn restart(&mut self) -> Result<(), PrintError> {
        self.send_raw(&commands::RESTART)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Probe the printer state.
    pub fn get_status(&mut self) -> Result<Status, PrintError> {
        let reply = self.query(&commands::STATUS_PROBE, 1)?;
        Ok(tspl_core::decode(&reply))
    }

    /// Model name.
    pub fn get_printer_name(&mut self) -> Result<String, PrintError> {
        self.query_text(commands::QUERY_NAME)
    }

    /// Free memory report.
    pub fn get_printer_memory(&mut self) -> Result<String, PrintError> {
        self.query_text(commands::QUERY_MEMORY)
    }

    /// Printed distance.
    pub fn get_printer_mileage(&mut self) -> Result<String, PrintError> {
        self.query_text(commands::QUERY_MILEAGE)
    }

    /// Active code page.
    pub fn get_printer_codepage(&mut self) -> Result<String, PrintError> {
        self.query_text(commands::QUERY_CODEPAGE)
    }
}

impl Default for PrinterSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for PrinterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterSession")
            .field("state", &self.state)
            .field("connection", &self.connection)
            .finish()
    }
}
