use serde::{Deserialize, Serialize};
use std::fmt;

/// Short printable codes carried in `error` messages and failure callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadName,
    CallErr,
    DeveloperErr,
    SystemErr,
    ConnectErr,
    MediaErr,
    MediaWarning,
    InternalErr,
    PeerGone,
    AlreadyConnected,
    SignalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadName => "BAD_NAME",
            ErrorCode::CallErr => "CALL_ERR",
            ErrorCode::DeveloperErr => "DEVELOPER_ERR",
            ErrorCode::SystemErr => "SYSTEM_ERR",
            ErrorCode::ConnectErr => "CONNECT_ERR",
            ErrorCode::MediaErr => "MEDIA_ERR",
            ErrorCode::MediaWarning => "MEDIA_WARNING",
            ErrorCode::InternalErr => "INTERNAL_ERR",
            ErrorCode::PeerGone => "PEER_GONE",
            ErrorCode::AlreadyConnected => "ALREADY_CONNECTED",
            ErrorCode::SignalError => "SIGNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
