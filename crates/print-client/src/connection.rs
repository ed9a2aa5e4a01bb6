//! One open channel to a printer.
//!
//! A [`Connection`] owns the writing half of a transport link and a reader
//! thread that pumps everything the printer sends into an internal inbox
//! and out to subscribed observers. Events for one connection are emitted
//! from that single thread, so observers see them in order: `Connected`,
//! any number of `Data`, then exactly one `Disconnected`.
//!
//! `send` and `receive` take `&mut self`; callers that share a connection
//! across threads must serialize access themselves. [`DisconnectHandle`] is
//! the one operation that may run concurrently with them.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::transport::{self, Link, LinkCloser, LinkReader, LinkWriter};
use crate::{ConnectionType, Device, EventKind, PrintError, SessionConfig, SessionHandle, TransportEvent};

/// Size of the reader thread's scratch buffer.
const READ_BUFFER: usize = 4096;

/// Bytes shown in trace-level hex previews.
const PREVIEW_BYTES: usize = 32;

/// Observer list shared between an owner and its connections' reader
/// threads. Senders whose receiver is gone are pruned on the next event.
pub(crate) type Observers = Arc<Mutex<Vec<Sender<TransportEvent>>>>;

pub(crate) fn preview(bytes: &[u8]) -> String {
    format!("{:02x?}", &bytes[..bytes.len().min(PREVIEW_BYTES)])
}

/// State shared with the reader thread and any disconnect handles.
struct Shared {
    handle: SessionHandle,
    closed: AtomicBool,
    announced: AtomicBool,
    /// Set by the reader thread once it stops, before `Disconnected`.
    ended: AtomicBool,
    closer: LinkCloser,
    observers: Observers,
    failure: Mutex<Option<io::Error>>,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark closed and wake the reader. Returns `true` for the first call.
    fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            self.closer.close();
        }
        first
    }

    fn emit(&self, kind: EventKind) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        observers.retain(|tx| {
            tx.send(TransportEvent {
                handle: self.handle,
                kind: kind.clone(),
            })
            .is_ok()
        });
    }

    fn announce_disconnected(&self) {
        if !self.announced.swap(true, Ordering::SeqCst) {
            self.emit(EventKind::Disconnected);
        }
    }
}

/// Closes a connection from any thread.
///
/// Closing wakes the reader (immediately on TCP, within one poll interval
/// elsewhere), so a `receive` pending on another thread fails with
/// [`PrintError::SessionClosed`] instead of waiting out its timeout.
#[derive(Clone)]
pub struct DisconnectHandle {
    shared: Arc<Shared>,
}

impl DisconnectHandle {
    /// Close the connection. Safe to call any number of times.
    pub fn disconnect(&self) {
        if self.shared.close() {
            debug!(handle = %self.shared.handle, "disconnect requested");
        }
    }

    /// Handle of the connection this closes.
    pub fn handle(&self) -> SessionHandle {
        self.shared.handle
    }

    /// Whether the connection has been closed locally.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl std::fmt::Debug for DisconnectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisconnectHandle")
            .field("handle", &self.shared.handle)
            .field("closed", &self.shared.is_closed())
            .finish()
    }
}

/// An open channel bound to one [`Device`].
pub struct Connection {
    device: Device,
    writer: LinkWriter,
    inbox: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    shared: Arc<Shared>,
    pump: Option<JoinHandle<()>>,
}

impl Connection {
    /// Open a channel to `device`.
    ///
    /// Fails with `NotFound`, `PermissionDenied`, `ConnectFailed`,
    /// `InvalidAddress`, or `Unsupported` (transport not compiled in). A
    /// failed open leaves nothing running.
    pub fn open(device: &Device, config: &SessionConfig) -> Result<Self, PrintError> {
        Self::open_observed(device, config, Observers::default())
    }

    pub(crate) fn open_observed(
        device: &Device,
        config: &SessionConfig,
        observers: Observers,
    ) -> Result<Self, PrintError> {
        let Link {
            reader,
            writer,
            closer,
        } = transport::open(device, config)?;

        let handle = SessionHandle::next();
        let shared = Arc::new(Shared {
            handle,
            closed: AtomicBool::new(false),
            announced: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            closer,
            observers,
            failure: Mutex::new(None),
        });
        shared.emit(EventKind::Connected);

        let (tx, inbox) = mpsc::channel();
        let pump_shared = Arc::clone(&shared);
        let pump = thread::Builder::new()
            .name(format!("tspl-reader-{}", handle.get()))
            .spawn(move || pump(reader, &tx, &pump_shared))
            .map_err(|e| {
                shared.close();
                shared.announce_disconnected();
                PrintError::ConnectFailed {
                    target: device.target.clone(),
                    source: e,
                }
            })?;

        debug!(%handle, %device, "connected");
        Ok(Self {
            device: device.clone(),
            writer,
            inbox,
            pending: Vec::new(),
            shared,
            pump: Some(pump),
        })
    }

    /// This connection's handle.
    pub fn handle(&self) -> SessionHandle {
        self.shared.handle
    }

    /// The device this connection was opened to.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Transport in use.
    pub fn kind(&self) -> ConnectionType {
        self.device.kind
    }

    /// Whether the connection is neither closed locally nor dropped by the
    /// printer.
    pub fn is_open(&self) -> bool {
        !self.shared.is_closed() && !self.shared.ended.load(Ordering::SeqCst)
    }

    /// A handle that can close this connection from another thread.
    pub fn disconnect_handle(&self) -> DisconnectHandle {
        DisconnectHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Add an observer. It sees events from now on.
    pub fn subscribe(&self, tx: Sender<TransportEvent>) {
        self.shared
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
    }

    /// Write all of `bytes`.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
        if self.shared.is_closed() {
            return Err(PrintError::SessionClosed);
        }
        trace!(handle = %self.shared.handle, bytes = bytes.len(), head = %preview(bytes), "send");
        self.writer
            .write_all(bytes)
            .and_then(|()| self.writer.flush())
            .map_err(PrintError::WriteFailed)
    }

    /// Return up to `max_bytes` of received data, waiting at most `timeout`
    /// for the first byte.
    ///
    /// No data within the window is not an error: the result is empty.
    /// Once the connection is closed (locally or by the printer) this fails
    /// with [`PrintError::SessionClosed`], or with
    /// [`PrintError::ReadFailed`] once if the reader hit an I/O error.
    pub fn receive(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>, PrintError> {
        if max_bytes == 0 {
            return Err(PrintError::InvalidArgument {
                field: "max_bytes",
                reason: "must be at least 1".into(),
            });
        }
        if self.shared.is_closed() {
            return Err(PrintError::SessionClosed);
        }

        if self.pending.is_empty() {
            match self.inbox.recv_timeout(timeout) {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(Vec::new()),
                Err(RecvTimeoutError::Disconnected) => return Err(self.closed_error()),
            }
        }
        while self.pending.len() < max_bytes {
            match self.inbox.try_recv() {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(_) => break,
            }
        }

        let n = max_bytes.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    /// Discard everything received so far. Returns the number of bytes
    /// dropped.
    pub fn discard_input(&mut self) -> usize {
        let mut dropped = self.pending.len();
        self.pending.clear();
        while let Ok(chunk) = self.inbox.try_recv() {
            dropped += chunk.len();
        }
        if dropped > 0 {
            trace!(handle = %self.shared.handle, dropped, "discarded stale input");
        }
        dropped
    }

    /// Send `request` and wait for its reply.
    ///
    /// Stale input is discarded first so the reply cannot be confused with
    /// an earlier unsolicited message. An empty window becomes
    /// [`PrintError::Timeout`].
    pub fn query(
        &mut self,
        request: &[u8],
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, PrintError> {
        self.discard_input();
        self.send(request)?;
        let reply = self.receive(max_bytes, timeout)?;
        if reply.is_empty() {
            return Err(PrintError::Timeout { timeout });
        }
        Ok(reply)
    }

    /// Close the channel and wait for the reader thread to exit.
    ///
    /// Idempotent. Observers receive `Disconnected` before this returns.
    pub fn disconnect(&mut self) {
        if self.shared.close() {
            debug!(handle = %self.shared.handle, "disconnecting");
        }
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                warn!(handle = %self.shared.handle, "reader thread panicked");
                self.shared.announce_disconnected();
            }
        }
    }

    fn closed_error(&self) -> PrintError {
        let failure = self
            .shared
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match failure {
            Some(e) if !self.shared.is_closed() => PrintError::ReadFailed(e),
            _ => PrintError::SessionClosed,
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.shared.handle)
            .field("device", &self.device)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Reader thread body.
fn pump(mut reader: LinkReader, inbox: &Sender<Vec<u8>>, shared: &Shared) {
    let mut buf = vec![0u8; READ_BUFFER];
    while !shared.is_closed() {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!(handle = %shared.handle, "printer closed the connection");
                break;
            }
            Ok(n) => {
                if shared.is_closed() {
                    break;
                }
                let chunk = buf[..n].to_vec();
                trace!(handle = %shared.handle, bytes = n, head = %preview(&chunk), "received");
                // The owner may have stopped receiving; observers still get it.
                let _ = inbox.send(chunk.clone());
                shared.emit(EventKind::Data(chunk));
            }
            Err(e) if transport::is_idle(&e) => {}
            Err(e) => {
                if !shared.is_closed() {
                    warn!(handle = %shared.handle, error = %e, "reader failed");
                    *shared.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(e);
                }
                break;
            }
        }
    }
    shared.ended.store(true, Ordering::SeqCst);
    shared.announce_disconnected();
}
