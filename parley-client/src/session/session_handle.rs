use crate::callbacks::CallCallbacks;
use crate::error::CallError;
use crate::registry::{ConnectStatus, ConnectionSummary};
use crate::session::SessionCommand;
use parley_core::{OccupantList, PeerId};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Cloneable front door to a running `CallSession`.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { command_tx }
    }

    /// Start a call. Returns an error only for misuse (not connected to the
    /// relay yet, calling ourselves, session stopped); everything else is
    /// reported through `callbacks`.
    pub async fn call(
        &self,
        peer_id: impl Into<PeerId>,
        callbacks: CallCallbacks,
    ) -> Result<(), CallError> {
        let peer_id = peer_id.into();
        self.request(|reply| SessionCommand::Call {
            peer_id,
            callbacks,
            reply,
        })
        .await?
    }

    /// Idempotent; hanging up a peer we have nothing with does nothing.
    pub async fn hangup(&self, peer_id: impl Into<PeerId>) {
        let peer_id = peer_id.into();
        let _ = self
            .request(|reply| SessionCommand::Hangup { peer_id, reply })
            .await;
    }

    /// Returns once every hangup has been handed to the transport.
    pub async fn hangup_all(&self) {
        let _ = self
            .request(|reply| SessionCommand::HangupAll { reply })
            .await;
    }

    pub async fn connect_status(&self, peer_id: impl Into<PeerId>) -> ConnectStatus {
        let peer_id = peer_id.into();
        self.request(|reply| SessionCommand::ConnectStatus { peer_id, reply })
            .await
            .unwrap_or(ConnectStatus::NotConnected)
    }

    pub async fn connections(&self) -> Vec<ConnectionSummary> {
        self.request(|reply| SessionCommand::Connections { reply })
            .await
            .unwrap_or_default()
    }

    /// Our relay-assigned id, once the relay handed out a token.
    pub async fn self_id(&self) -> Option<PeerId> {
        self.request(|reply| SessionCommand::SelfId { reply })
            .await
            .ok()
            .flatten()
    }

    pub async fn occupants(&self, room: impl Into<String>) -> Option<OccupantList> {
        let room = room.into();
        self.request(|reply| SessionCommand::Occupants { room, reply })
            .await
            .ok()
            .flatten()
    }

    pub async fn peer_name(&self, peer_id: impl Into<PeerId>) -> String {
        let peer_id = peer_id.into();
        let fallback = peer_id.to_string();
        self.request(|reply| SessionCommand::PeerName { peer_id, reply })
            .await
            .unwrap_or(fallback)
    }

    /// True if `ip` belongs to a TURN server we were configured with or
    /// saw relay candidates from.
    pub async fn is_turn_server(&self, ip: impl Into<String>) -> bool {
        let ip = ip.into();
        self.request(|reply| SessionCommand::IsTurnServer { ip, reply })
            .await
            .unwrap_or(false)
    }

    pub async fn session_field(&self, name: impl Into<String>) -> Option<Value> {
        let name = name.into();
        self.request(|reply| SessionCommand::SessionField { name, reply })
            .await
            .ok()
            .flatten()
    }

    pub async fn room_field(&self, room: impl Into<String>, name: impl Into<String>) -> Option<Value> {
        let room = room.into();
        let name = name.into();
        self.request(|reply| SessionCommand::RoomField { room, name, reply })
            .await
            .ok()
            .flatten()
    }

    /// The relay connection dropped. Tears every call down locally, without
    /// trying to signal the peers.
    pub async fn transport_closed(&self) {
        let _ = self
            .request(|reply| SessionCommand::TransportClosed { reply })
            .await;
    }

    /// Hang up everything and stop the session loop.
    pub async fn shutdown(&self) {
        if self.command_tx.send(SessionCommand::Shutdown).await.is_err() {
            debug!("Session already stopped");
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, CallError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(build(reply))
            .await
            .map_err(|_| not_running())?;
        rx.await.map_err(|_| not_running())
    }
}

fn not_running() -> CallError {
    CallError::Developer("call session is not running".into())
}
