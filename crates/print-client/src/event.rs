//! Session handles and transport notifications.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one connection.
///
/// Handles come from a monotonically increasing counter and are never
/// reused, so a handle that outlives its connection can never alias a newer
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub(crate) fn next() -> Self {
        SessionHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the handle.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The channel opened.
    Connected,
    /// The channel closed, locally or remotely. Always the last event.
    Disconnected,
    /// Bytes arrived from the printer.
    Data(Vec<u8>),
}

/// A notification tagged with the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Originating connection.
    pub handle: SessionHandle,
    /// The event itself.
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_increasing() {
        let a = SessionHandle::next();
        let b = SessionHandle::next();
        assert!(b > a);
        assert_ne!(a, b);
        assert_eq!(format!("{a}"), format!("#{}", a.get()));
    }
}
