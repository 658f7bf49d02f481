use crate::callbacks::CallCallbacks;
use crate::connection::{ConnectionId, PeerLink};
use crate::media::MediaStream;
use parley_core::{IceCandidate, PeerId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// We sent the offer.
    Initiator,
    /// We answered the peer's offer.
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Negotiating,
    Established,
    Cancelled,
}

/// Shared with in-flight negotiation tasks so they can stop early once the
/// entry is hung up.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-peer connection state, owned by the registry.
pub struct PeerEntry {
    pub(crate) peer_id: PeerId,
    pub(crate) role: Role,
    pub(crate) lifecycle: Lifecycle,
    /// Description exchange is complete; candidates now flow directly.
    pub(crate) media_started: bool,
    /// Local candidates held back until `media_started`.
    pub(crate) pending_candidates: Vec<IceCandidate>,
    pub(crate) connected_at: Option<SystemTime>,
    pub(crate) callbacks: Option<CallCallbacks>,
    pub(crate) remote_stream: Option<MediaStream>,
    /// The listener has already been told the stream closed.
    pub(crate) stream_closed: bool,
    pub(crate) link: Arc<dyn PeerLink>,
    pub(crate) conn_id: ConnectionId,
    pub(crate) cancel: CancelFlag,
}

impl PeerEntry {
    pub(crate) fn new(
        peer_id: PeerId,
        role: Role,
        conn_id: ConnectionId,
        link: Arc<dyn PeerLink>,
        callbacks: Option<CallCallbacks>,
    ) -> Self {
        Self {
            peer_id,
            role,
            lifecycle: Lifecycle::Negotiating,
            media_started: false,
            pending_candidates: Vec::new(),
            connected_at: None,
            callbacks,
            remote_stream: None,
            stream_closed: false,
            link,
            conn_id,
            cancel: CancelFlag::default(),
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn media_started(&self) -> bool {
        self.media_started
    }

    pub fn connected_at(&self) -> Option<SystemTime> {
        self.connected_at
    }

    /// True once the peer's stream started and nobody was told it ended.
    pub(crate) fn stream_open(&self) -> bool {
        self.media_started && !self.stream_closed
    }

    /// Close the underlying connection. Failures are logged and swallowed:
    /// the entry is already gone from the registry.
    pub(crate) async fn release(self) {
        if let Err(e) = self.link.close().await {
            warn!("Failed to close connection to {}: {}", self.peer_id, e);
        }
    }
}

impl fmt::Debug for PeerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerEntry")
            .field("peer_id", &self.peer_id)
            .field("role", &self.role)
            .field("lifecycle", &self.lifecycle)
            .field("media_started", &self.media_started)
            .field("pending_candidates", &self.pending_candidates.len())
            .field("conn_id", &self.conn_id)
            .finish()
    }
}
