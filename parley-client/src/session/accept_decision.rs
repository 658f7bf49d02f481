use crate::session::SessionEvent;
use parley_core::PeerId;
use tokio::sync::mpsc;
use tracing::debug;

/// The local verdict on one incoming offer. Consuming it answers or rejects
/// the offer; dropping it leaves the offer pending until the caller hangs up.
#[derive(Debug)]
pub struct AcceptDecision {
    peer_id: PeerId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl AcceptDecision {
    pub(crate) fn new(peer_id: PeerId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { peer_id, tx }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn accept(self) {
        self.decide(true);
    }

    pub fn reject(self) {
        self.decide(false);
    }

    pub fn decide(self, accepted: bool) {
        let sent = self.tx.send(SessionEvent::AcceptDecided {
            peer_id: self.peer_id,
            accepted,
        });
        if sent.is_err() {
            debug!("Session stopped before the accept decision arrived");
        }
    }
}
