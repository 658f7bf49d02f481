use crate::registry::{Lifecycle, Role};
use parley_core::PeerId;
use serde::Serialize;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStatus {
    NotConnected,
    Connecting,
    Connected,
}

/// Read-only view of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub peer_id: PeerId,
    pub role: Role,
    pub lifecycle: Lifecycle,
    pub status: ConnectStatus,
    pub connected_at: Option<SystemTime>,
}

impl ConnectionSummary {
    pub fn is_initiator(&self) -> bool {
        self.role == Role::Initiator
    }
}
