use thiserror::Error;

/// Contract violations inside the follow controller.
///
/// The event surface itself is not a fallible API; this exists for the one
/// programming-contract violation worth failing loudly on. Callers at the
/// message-handling boundary log it and keep going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FollowError {
    /// A count response arrived while no activation (and therefore no
    /// label generator) is live.
    #[error("no activation is live; count response has no label generator to draw from")]
    NoActiveActivation,
}

/// Envelope encode/decode failures at the transport boundary.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}
