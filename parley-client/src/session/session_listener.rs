use crate::error::CallError;
use crate::media::MediaStream;
use crate::session::AcceptDecision;
use async_trait::async_trait;
use parley_core::{OccupantInfo, OccupantList, PeerId};
use tracing::warn;

/// Application hooks invoked from inside the session loop.
///
/// Every method has a default, so implementors override only what they need.
/// Hooks run on the session task: awaiting a `SessionHandle` request from
/// inside one would wait on the very loop that is running it.
#[async_trait]
pub trait SessionListener: Send + Sync + 'static {
    /// Decide whether to answer an incoming offer. `decision` may be moved
    /// elsewhere and resolved later. Accepts immediately by default.
    async fn accept_check(&self, _peer_id: PeerId, decision: AcceptDecision) {
        decision.accept();
    }

    async fn on_stream_acquired(&self, _peer_id: PeerId, _stream: MediaStream) {}

    async fn on_stream_closed(&self, _peer_id: PeerId) {}

    /// `occupants` never contains ourselves; our own entry is `self_info`.
    async fn on_room_occupants(
        &self,
        _room: String,
        _occupants: OccupantList,
        _self_info: Option<OccupantInfo>,
    ) {
    }

    async fn on_room_entry(&self, _entered: bool, _room: String) {}

    /// An incoming offer went away without being answered. `explicitly` is
    /// true when the caller hung up, false when our own call superseded it.
    async fn call_cancelled(&self, _peer_id: PeerId, _explicitly: bool) {}

    /// Errors that belong to no call with a failure callback.
    async fn on_error(&self, error: CallError) {
        warn!("Unhandled call error [{}]: {}", error.code(), error);
    }

    async fn on_disconnect(&self) {}
}

/// Listener that keeps every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultListener;

#[async_trait]
impl SessionListener for DefaultListener {}
