use thiserror::Error;

/// Errors returned by the MiHome driver.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value was rejected before any radio I/O.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The operation needs hardware that is not wired on this board.
    #[error("not supported: {0}")]
    Unsupported(String),

    /// An internal consistency check failed (codec defect).
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error reported by the GPIO or transceiver layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-I/O failure reported by the GPIO or transceiver layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The event bus has been shut down.
    #[error("event bus closed")]
    BusClosed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A received frame that the protocol decoder could not fully parse.
///
/// Carried inside [`ReceivedEvent`](crate::ReceivedEvent); never aborts the
/// receive loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode failed: {0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
