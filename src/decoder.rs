use std::fmt::Debug;

use crate::error::DecodeError;

/// Telemetry protocol decoder for received FSK frames.
pub trait Decoder: Send + Sync {
    /// Structured message produced from a frame.
    type Message: Debug + Send + Sync + 'static;

    /// Decode one raw frame.
    ///
    /// A decoder may return a partial message together with a failure.
    fn decode(&self, data: &[u8]) -> (Option<Self::Message>, Option<DecodeError>);
}
