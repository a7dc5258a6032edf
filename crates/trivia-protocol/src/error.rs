//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, unknown frame type,
    /// missing fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded fine but is not allowed at this point of the
    /// conversation (e.g. `Say` before `Hello`).
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
