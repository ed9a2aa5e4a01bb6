//! Connections addressed by handle.
//!
//! Callers that juggle several printers (or sit behind an FFI-style
//! surface that only passes integers around) keep their connections in a
//! [`SessionArena`] and address them by [`SessionHandle`]. Handles are
//! never reused, so a stale handle simply misses.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::connection::Observers;
use crate::{Connection, Device, PrintError, SessionConfig, SessionHandle, TransportEvent};

/// A set of open connections keyed by handle.
#[derive(Default)]
pub struct SessionArena {
    config: SessionConfig,
    connections: HashMap<SessionHandle, Connection>,
    observers: Observers,
}

impl SessionArena {
    /// An empty arena opening connections with `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            connections: HashMap::new(),
            observers: Observers::default(),
        }
    }

    /// Events from every connection opened through this arena from now on,
    /// tagged by handle.
    pub fn subscribe(&self) -> Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Open a connection to `device` and return its handle.
    pub fn connect(&mut self, device: &Device) -> Result<SessionHandle, PrintError> {
        let connection =
            Connection::open_observed(device, &self.config, Arc::clone(&self.observers))?;
        Ok(self.insert(connection))
    }

    /// Take ownership of an already-open connection.
    pub fn insert(&mut self, connection: Connection) -> SessionHandle {
        let handle = connection.handle();
        self.connections.insert(handle, connection);
        handle
    }

    /// Look up a connection.
    pub fn get(&self, handle: SessionHandle) -> Option<&Connection> {
        self.connections.get(&handle)
    }

    /// Look up a connection mutably.
    pub fn get_mut(&mut self, handle: SessionHandle) -> Option<&mut Connection> {
        self.connections.get_mut(&handle)
    }

    /// Remove a connection without closing it.
    pub fn remove(&mut self, handle: SessionHandle) -> Option<Connection> {
        self.connections.remove(&handle)
    }

    /// Write to the connection behind `handle`.
    pub fn send(&mut self, handle: SessionHandle, bytes: &[u8]) -> Result<(), PrintError> {
        self.lookup(handle)?.send(bytes)
    }

    /// Read from the connection behind `handle`.
    pub fn receive(
        &mut self,
        handle: SessionHandle,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, PrintError> {
        self.lookup(handle)?.receive(max_bytes, timeout)
    }

    /// Close and forget `handle`. Unknown handles are ignored.
    pub fn disconnect(&mut self, handle: SessionHandle) {
        if let Some(mut connection) = self.connections.remove(&handle) {
            debug!(%handle, "removing from arena");
            connection.disconnect();
        }
    }

    /// Close every connection.
    pub fn disconnect_all(&mut self) {
        for (_, mut connection) in self.connections.drain() {
            connection.disconnect();
        }
    }

    /// Handles of all connections, in ascending order.
    pub fn handles(&self) -> Vec<SessionHandle> {
        let mut handles: Vec<_> = self.connections.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Number of connections held.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the arena holds no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn lookup(&mut self, handle: SessionHandle) -> Result<&mut Connection, PrintError> {
        self.connections
            .get_mut(&handle)
            .ok_or(PrintError::SessionClosed)
    }
}

impl std::fmt::Debug for SessionArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionArena")
            .field("handles", &self.handles())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn stale_handles_miss() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let device = Device::net(listener.local_addr().unwrap().to_string());
        let mut arena = SessionArena::default();

        let first = arena.connect(&device).unwrap();
        arena.disconnect(first);
        arena.disconnect(first);
        let second = arena.connect(&device).unwrap();

        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert!(matches!(arena.send(first, b"CLS \r\n"), Err(PrintError::SessionClosed)));
        assert!(arena.send(second, b"CLS \r\n").is_ok());
        assert_eq!(arena.handles(), vec![second]);
    }

    #[test]
    fn events_are_tagged_per_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let device = Device::net(listener.local_addr().unwrap().to_string());
        let mut arena = SessionArena::default();
        let events = arena.subscribe();

        let a = arena.connect(&device).unwrap();
        let b = arena.connect(&device).unwrap();
        arena.disconnect_all();
        assert!(arena.is_empty());

        let seen: Vec<TransportEvent> = events.try_iter().collect();
        for handle in [a, b] {
            let kinds: Vec<_> = seen
                .iter()
                .filter(|e| e.handle == handle)
                .map(|e| e.kind.clone())
                .collect();
            assert_eq!(
                kinds,
                vec![crate::EventKind::Connected, crate::EventKind::Disconnected]
            );
        }
    }
}
