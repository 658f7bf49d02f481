use crate::media::MediaStream;
use crate::session::SessionEvent;
use parley_core::{IceCandidate, PeerId};
use tokio::sync::mpsc;
use tracing::debug;

/// Identifies one underlying connection. A peer that is hung up and called
/// again gets a fresh id, so late events from the old connection can be
/// told apart from the new one.
pub type ConnectionId = u64;

/// Asynchronous notifications raised by an underlying connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Trickle ICE: a local candidate is ready to be sent to the peer.
    CandidateDiscovered(IceCandidate),
    /// Remote media (or the data channel) is flowing.
    StreamAdded(MediaStream),
    StreamRemoved,
}

/// Handed to a connector so the connection it builds can report back into
/// the session that owns it.
#[derive(Debug, Clone)]
pub struct LinkEventSink {
    peer_id: PeerId,
    conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl LinkEventSink {
    pub(crate) fn new(
        peer_id: PeerId,
        conn_id: ConnectionId,
        tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            peer_id,
            conn_id,
            tx,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn candidate_discovered(&self, candidate: IceCandidate) {
        self.emit(LinkEvent::CandidateDiscovered(candidate));
    }

    pub fn stream_added(&self, stream: MediaStream) {
        self.emit(LinkEvent::StreamAdded(stream));
    }

    pub fn stream_removed(&self) {
        self.emit(LinkEvent::StreamRemoved);
    }

    fn emit(&self, event: LinkEvent) {
        let sent = self.tx.send(SessionEvent::Link {
            peer_id: self.peer_id.clone(),
            conn_id: self.conn_id,
            event,
        });
        if sent.is_err() {
            debug!("Session for {} is gone, dropping link event", self.peer_id);
        }
    }
}
