use crate::callbacks::CallCallbacks;
use crate::error::CallError;
use crate::registry::{ConnectStatus, ConnectionSummary};
use parley_core::{OccupantList, PeerId};
use serde_json::Value;
use tokio::sync::oneshot;

/// Requests from `SessionHandle` into the session loop.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Call {
        peer_id: PeerId,
        callbacks: CallCallbacks,
        reply: oneshot::Sender<Result<(), CallError>>,
    },
    Hangup {
        peer_id: PeerId,
        reply: oneshot::Sender<()>,
    },
    HangupAll {
        reply: oneshot::Sender<()>,
    },
    ConnectStatus {
        peer_id: PeerId,
        reply: oneshot::Sender<ConnectStatus>,
    },
    Connections {
        reply: oneshot::Sender<Vec<ConnectionSummary>>,
    },
    SelfId {
        reply: oneshot::Sender<Option<PeerId>>,
    },
    Occupants {
        room: String,
        reply: oneshot::Sender<Option<OccupantList>>,
    },
    PeerName {
        peer_id: PeerId,
        reply: oneshot::Sender<String>,
    },
    IsTurnServer {
        ip: String,
        reply: oneshot::Sender<bool>,
    },
    SessionField {
        name: String,
        reply: oneshot::Sender<Option<Value>>,
    },
    RoomField {
        room: String,
        name: String,
        reply: oneshot::Sender<Option<Value>>,
    },
    TransportClosed {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}
