//! Error type for frame construction and bitmap encoding.

/// Errors raised while building command frames or encoding bitmaps.
///
/// Every operation in this crate is pure, so these errors always describe
/// bad caller input or an unreadable image, never an I/O condition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// A parameter was rejected before any bytes were produced.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        field: &'static str,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// Source image bytes could not be decoded.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// A byte sequence is not a well-formed command frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl CommandError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CommandError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}
