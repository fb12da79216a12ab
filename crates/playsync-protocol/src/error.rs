//! Error types for the protocol layer.

/// Errors that can occur while framing events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame wasn't valid JSON, or didn't match any known event.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but can't be accepted, e.g. a binary frame.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Every framing error is the client's fault.
    pub fn kind(&self) -> crate::ErrorKind {
        crate::ErrorKind::InvalidInput
    }
}
