use crate::error::CallError;
use crate::session::CallSession;
use parley_core::{IceCandidate, PeerId, SignalMessage};
use tracing::{debug, warn};

impl CallSession {
    pub(super) async fn handle_remote_candidate(&mut self, caller: PeerId, candidate: IceCandidate) {
        if let Some(address) = candidate.relay_address() {
            self.turn_servers.insert(address.to_owned());
        }

        let link = self
            .registry
            .get(&caller)
            .filter(|entry| entry.media_started)
            .map(|entry| entry.link.clone());

        match link {
            Some(link) => {
                if let Err(e) = link.add_candidate(&candidate).await {
                    warn!("Failed to add candidate from {}: {}", caller, e);
                }
            }
            None if self.expects_candidates_from(&caller) => {
                debug!("Queueing candidate from {}", caller);
                self.registry.enqueue_remote_candidate(caller, candidate);
            }
            None => debug!("Dropping candidate from {}: no call in progress", caller),
        }
    }

    /// A call with `peer_id` is under way, even if its link is not ready.
    fn expects_candidates_from(&self, peer_id: &PeerId) -> bool {
        self.registry.contains(peer_id)
            || self.registry.has_pending_offer(peer_id)
            || self
                .deferred_answers
                .iter()
                .any(|(deferred, _)| deferred == peer_id)
    }

    pub(super) async fn send_local_candidate(&self, peer_id: &PeerId, candidate: IceCandidate) {
        if let Err(e) = self
            .signaling
            .send(Some(peer_id), SignalMessage::Candidate(candidate))
            .await
        {
            warn!("Candidate for {} was not delivered: {}", peer_id, e);
            let err = CallError::PeerGone(format!("candidate for {} disappeared: {}", peer_id, e));
            self.report_failure(peer_id, err).await;
        }
    }

    /// Apply queued remote candidates in arrival order.
    pub(super) async fn flush_remote_candidates(&mut self, peer_id: &PeerId) {
        let Some(link) = self.registry.get(peer_id).map(|entry| entry.link.clone()) else {
            return;
        };
        for candidate in self.registry.drain_remote_candidates(peer_id) {
            if let Err(e) = link.add_candidate(&candidate).await {
                warn!("Failed to add queued candidate from {}: {}", peer_id, e);
            }
        }
    }

    /// The description exchange is done: release held local candidates and
    /// apply queued remote ones.
    pub(super) async fn start_media(&mut self, peer_id: &PeerId) {
        let Some(held) = self.registry.mark_media_started(peer_id) else {
            return;
        };
        for candidate in held {
            self.send_local_candidate(peer_id, candidate).await;
        }
        self.flush_remote_candidates(peer_id).await;
    }
}
