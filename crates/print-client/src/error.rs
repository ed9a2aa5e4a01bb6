//! Typed error types for the print client.

use std::io;
use std::time::Duration;

use tspl_core::CommandError;

/// Connection, transfer, and argument failures.
///
/// Every failure surfaces to the caller of the operation that triggered it;
/// nothing in this crate retries on its own. Use
/// [`PrintError::is_retryable()`] to drive a caller-side retry policy.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    // -- Caller input --
    /// A parameter was rejected before anything was sent.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        field: &'static str,
        /// Description of the violation.
        reason: String,
    },

    /// The target string is not a well-formed address for its transport.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Image bytes could not be decoded.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// A frame could not be re-parsed.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    // -- Discovery / connection --
    /// The transport's hardware or radio is absent or disabled.
    #[error("{transport} transport not available: {reason}")]
    NotAvailable {
        /// Transport name.
        transport: &'static str,
        /// What is missing.
        reason: String,
    },

    /// No device matches the target.
    #[error("device not found: {target}")]
    NotFound {
        /// The target that was looked up.
        target: String,
    },

    /// The OS or user declined access to the device.
    #[error("permission denied: {target}")]
    PermissionDenied {
        /// The target that was opened.
        target: String,
    },

    /// Opening the channel failed for any other reason.
    #[error("connect failed: {target}")]
    ConnectFailed {
        /// The target that was attempted.
        target: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The requested transport is not compiled in or cannot perform the
    /// operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    // -- I/O --
    /// Writing to the printer failed.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// Reading from the printer failed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// No reply arrived within the response window.
    #[error("no response within {timeout:?}")]
    Timeout {
        /// The window that elapsed.
        timeout: Duration,
    },

    /// The session was closed, locally or by the printer.
    #[error("session closed")]
    SessionClosed,

    /// A background task ended without producing a result.
    #[error("background task aborted")]
    TaskAborted,
}

impl PrintError {
    /// Returns `true` if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PrintError::WriteFailed(_) | PrintError::ReadFailed(_) | PrintError::Timeout { .. }
        ) || matches!(self, PrintError::ConnectFailed { source, .. }
            if source.kind() == io::ErrorKind::TimedOut)
    }
}

impl From<CommandError> for PrintError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::InvalidArgument { field, reason } => {
                PrintError::InvalidArgument { field, reason }
            }
            CommandError::Decode(msg) => PrintError::Decode(msg),
            CommandError::MalformedFrame(msg) => PrintError::MalformedFrame(msg),
            other => PrintError::MalformedFrame(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(
            PrintError::WriteFailed(io::Error::new(io::ErrorKind::BrokenPipe, "test"))
                .is_retryable()
        );
        assert!(PrintError::ReadFailed(io::Error::other("test")).is_retryable());
        assert!(
            PrintError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(
            PrintError::ConnectFailed {
                target: "x".into(),
                source: io::Error::new(io::ErrorKind::TimedOut, "test"),
            }
            .is_retryable()
        );
    }

    #[test]
    fn non_retryable_errors() {
        assert!(
            !PrintError::ConnectFailed {
                target: "x".into(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "test"),
            }
            .is_retryable()
        );
        assert!(!PrintError::InvalidAddress("x".into()).is_retryable());
        assert!(!PrintError::NotFound { target: "x".into() }.is_retryable());
        assert!(!PrintError::PermissionDenied { target: "x".into() }.is_retryable());
        assert!(
            !PrintError::NotAvailable {
                transport: "usb",
                reason: "x".into()
            }
            .is_retryable()
        );
        assert!(!PrintError::Unsupported("x".into()).is_retryable());
        assert!(!PrintError::SessionClosed.is_retryable());
        assert!(!PrintError::Decode("x".into()).is_retryable());
    }

    #[test]
    fn command_errors_convert() {
        let err: PrintError = tspl_core::commands::speed(1.5).unwrap_err().into();
        assert!(matches!(err, PrintError::InvalidArgument { field: "speed", .. }));

        let err: PrintError = CommandError::Decode("bad".into()).into();
        assert!(matches!(err, PrintError::Decode(ref m) if m == "bad"));
    }
}
