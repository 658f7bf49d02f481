use parley_core::ErrorCode;
use thiserror::Error;

/// Failure reported by the signaling transport when a message could not be
/// delivered. `code` is whatever the relay (or the transport) sent back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {text}")]
pub struct SignalingError {
    pub code: String,
    pub text: String,
}

impl SignalingError {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// Everything a call can fail with. Reported through a call's failure
/// callback when one is attached, otherwise through the session listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The API was used in a way that can never succeed.
    #[error("developer error: {0}")]
    Developer(String),

    #[error("already connected: {0}")]
    AlreadyConnected(String),

    /// The connection backend failed to build or negotiate a connection.
    #[error("system error: {0}")]
    System(String),

    /// A message for the peer could not be delivered; it is likely gone.
    #[error("peer gone: {0}")]
    PeerGone(String),

    #[error("media error: {0}")]
    Media(String),

    #[error("signaling error {code}: {text}")]
    Signaling { code: String, text: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CallError {
    /// Short printable code; relay codes are passed through unchanged.
    pub fn code(&self) -> &str {
        match self {
            CallError::Developer(_) => ErrorCode::DeveloperErr.as_str(),
            CallError::AlreadyConnected(_) => ErrorCode::AlreadyConnected.as_str(),
            CallError::System(_) => ErrorCode::SystemErr.as_str(),
            CallError::PeerGone(_) => ErrorCode::PeerGone.as_str(),
            CallError::Media(_) => ErrorCode::MediaErr.as_str(),
            CallError::Signaling { code, .. } => code,
            CallError::Internal(_) => ErrorCode::InternalErr.as_str(),
        }
    }
}

impl From<SignalingError> for CallError {
    fn from(err: SignalingError) -> Self {
        CallError::Signaling {
            code: err.code,
            text: err.text,
        }
    }
}
