mod accept_decision;
mod call_impl;
mod candidate_impl;
mod handle_answer_impl;
mod handle_offer_impl;
mod handle_signal_impl;
mod hangup_impl;
mod link_event_impl;
mod media_impl;
mod relay_data_impl;
mod session_command;
mod session_event;
mod session_handle;
mod session_listener;

pub use accept_decision::*;
pub(crate) use session_command::*;
pub(crate) use session_event::*;
pub use session_handle::*;
pub use session_listener::*;

use crate::callbacks::CallCallbacks;
use crate::config::{LinkConfig, SessionConfig};
use crate::connection::{ConnectionId, LinkEventSink, PeerConnector, PeerLink};
use crate::error::CallError;
use crate::media::{MediaSource, MediaStream, NoMediaSource};
use crate::occupants::OccupantReconciler;
use crate::registry::{PeerRegistry, Role};
use crate::signaling::SignalingTransport;
use parley_core::{Envelope, IceServerConfig, PeerId, SessionDescription};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// External collaborators a session drives.
pub struct SessionParts {
    pub signaling: Arc<dyn SignalingTransport>,
    pub connector: Arc<dyn PeerConnector>,
    pub media: Arc<dyn MediaSource>,
    pub listener: Arc<dyn SessionListener>,
}

impl SessionParts {
    /// Parts with no media source and the default listener.
    pub fn new(signaling: Arc<dyn SignalingTransport>, connector: Arc<dyn PeerConnector>) -> Self {
        Self {
            signaling,
            connector,
            media: Arc::new(NoMediaSource),
            listener: Arc::new(DefaultListener),
        }
    }

    pub fn with_media(mut self, media: Arc<dyn MediaSource>) -> Self {
        self.media = media;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }
}

/// The call manager for one signed-in client.
///
/// All state lives on the task running `run`; inbound relay messages,
/// handle commands and completions of background work are processed one at
/// a time, in the order the loop picks them up.
pub struct CallSession {
    config: SessionConfig,
    self_id: Option<PeerId>,
    registry: PeerRegistry,
    occupants: OccupantReconciler,
    /// Pushed by the relay; `config.ice_servers` until then.
    ice_servers: Option<Vec<IceServerConfig>>,
    turn_servers: HashSet<String>,
    session_fields: Map<String, Value>,
    local_stream: Option<MediaStream>,
    media_requested: bool,
    deferred_calls: Vec<(PeerId, CallCallbacks)>,
    deferred_answers: Vec<(PeerId, SessionDescription)>,
    signaling: Arc<dyn SignalingTransport>,
    connector: Arc<dyn PeerConnector>,
    media: Arc<dyn MediaSource>,
    listener: Arc<dyn SessionListener>,
    command_rx: mpsc::Receiver<SessionCommand>,
    inbound_rx: mpsc::Receiver<Envelope>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl CallSession {
    /// `inbound_rx` carries every message the relay delivers to us.
    pub fn new(
        config: SessionConfig,
        parts: SessionParts,
        inbound_rx: mpsc::Receiver<Envelope>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Self {
            config,
            self_id: None,
            registry: PeerRegistry::new(),
            occupants: OccupantReconciler::new(),
            ice_servers: None,
            turn_servers: HashSet::new(),
            session_fields: Map::new(),
            local_stream: None,
            media_requested: false,
            deferred_calls: Vec::new(),
            deferred_answers: Vec::new(),
            signaling: parts.signaling,
            connector: parts.connector,
            media: parts.media,
            listener: parts.listener,
            command_rx,
            inbound_rx,
            event_rx,
            event_tx,
        };

        (session, SessionHandle::new(command_tx))
    }

    pub async fn run(mut self) {
        info!("Call session loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) => {
                            info!("Shutdown requested");
                            self.hangup_all().await;
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All session handles dropped. Shutting down session.");
                            self.hangup_all().await;
                            break;
                        }
                    }
                }

                msg = self.inbound_rx.recv() => {
                    match msg {
                        Some(envelope) => self.handle_signal(envelope).await,
                        None => {
                            warn!("Signaling channel closed unexpectedly");
                            self.handle_transport_closed().await;
                            break;
                        }
                    }
                }

                Some(evt) = self.event_rx.recv() => self.handle_event(evt).await,
            }
        }

        info!("Call session loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Call {
                peer_id,
                callbacks,
                reply,
            } => {
                let result = self.handle_call(peer_id, callbacks).await;
                let _ = reply.send(result);
            }
            SessionCommand::Hangup { peer_id, reply } => {
                self.hangup(&peer_id).await;
                let _ = reply.send(());
            }
            SessionCommand::HangupAll { reply } => {
                self.hangup_all().await;
                let _ = reply.send(());
            }
            SessionCommand::ConnectStatus { peer_id, reply } => {
                let _ = reply.send(self.registry.status(&peer_id));
            }
            SessionCommand::Connections { reply } => {
                let _ = reply.send(self.registry.summaries());
            }
            SessionCommand::SelfId { reply } => {
                let _ = reply.send(self.self_id.clone());
            }
            SessionCommand::Occupants { room, reply } => {
                let _ = reply.send(self.occupants.occupants(&room));
            }
            SessionCommand::PeerName { peer_id, reply } => {
                let _ = reply.send(self.occupants.peer_name(&peer_id));
            }
            SessionCommand::IsTurnServer { ip, reply } => {
                let _ = reply.send(self.turn_servers.contains(&ip));
            }
            SessionCommand::SessionField { name, reply } => {
                let _ = reply.send(self.session_fields.get(&name).cloned());
            }
            SessionCommand::RoomField { room, name, reply } => {
                let _ = reply.send(self.occupants.room_field(&room, &name).cloned());
            }
            SessionCommand::TransportClosed { reply } => {
                self.handle_transport_closed().await;
                let _ = reply.send(());
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::MediaAcquired(result) => self.handle_media_acquired(result).await,
            SessionEvent::OfferCreated {
                peer_id,
                conn_id,
                result,
            } => self.handle_offer_created(peer_id, conn_id, result).await,
            SessionEvent::AnswerCreated {
                peer_id,
                conn_id,
                result,
            } => self.handle_answer_created(peer_id, conn_id, result).await,
            SessionEvent::AcceptDecided { peer_id, accepted } => {
                self.handle_accept_decided(peer_id, accepted).await
            }
            SessionEvent::Link {
                peer_id,
                conn_id,
                event,
            } => self.handle_link_event(peer_id, conn_id, event).await,
        }
    }

    fn link_config(&self, role: Role) -> LinkConfig {
        LinkConfig {
            ice_servers: self
                .ice_servers
                .clone()
                .unwrap_or_else(|| self.config.ice_servers.clone()),
            initiator: role == Role::Initiator,
            data_channel: self.config.media.data,
        }
    }

    async fn open_link(
        &self,
        peer_id: &PeerId,
        conn_id: ConnectionId,
        role: Role,
    ) -> Result<Arc<dyn PeerLink>, CallError> {
        let config = self.link_config(role);
        let events = LinkEventSink::new(peer_id.clone(), conn_id, self.event_tx.clone());
        debug!("Opening {:?} connection #{} to {}", role, conn_id, peer_id);
        self.connector
            .create_connection(&config, self.local_stream.as_ref(), events)
            .await
    }

    /// Route `err` to the peer's failure callback, or to the listener when
    /// there is none.
    async fn report_failure(&self, peer_id: &PeerId, err: CallError) {
        let handled = self
            .registry
            .get(peer_id)
            .and_then(|entry| entry.callbacks.as_ref())
            .is_some_and(|callbacks| callbacks.failure(err.clone()));
        if !handled {
            self.listener.on_error(err).await;
        }
    }
}
