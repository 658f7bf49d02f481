use parley_core::{IceCandidate, PeerId};
use std::collections::HashMap;

/// Remote candidates that arrived before the description exchange with their
/// peer completed. Kept in arrival order per peer.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    queues: HashMap<PeerId, Vec<IceCandidate>>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, peer_id: PeerId, candidate: IceCandidate) {
        self.queues.entry(peer_id).or_default().push(candidate);
    }

    /// Take every queued candidate for the peer, oldest first.
    pub fn drain(&mut self, peer_id: &PeerId) -> Vec<IceCandidate> {
        self.queues.remove(peer_id).unwrap_or_default()
    }

    pub fn clear(&mut self, peer_id: &PeerId) {
        self.queues.remove(peer_id);
    }

    pub fn clear_all(&mut self) {
        self.queues.clear();
    }

    pub fn len(&self, peer_id: &PeerId) -> usize {
        self.queues.get(peer_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
