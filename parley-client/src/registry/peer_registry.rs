use crate::callbacks::CallCallbacks;
use crate::connection::{ConnectionId, PeerLink};
use crate::error::CallError;
use crate::registry::{
    CandidateQueue, ConnectStatus, ConnectionSummary, Lifecycle, PeerEntry, Role,
};
use parley_core::{IceCandidate, PeerId, SessionDescription};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

/// Single source of truth for per-peer call state.
///
/// Holds at most one entry per peer, plus the two pieces of state that exist
/// before an entry does: offers awaiting the local accept decision, and
/// outgoing calls awaiting the remote one.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    entries: HashMap<PeerId, PeerEntry>,
    pending_offers: HashMap<PeerId, SessionDescription>,
    acceptance_pending: HashSet<PeerId>,
    remote_candidates: CandidateQueue,
    last_conn_id: ConnectionId,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_connection_id(&mut self) -> ConnectionId {
        self.last_conn_id += 1;
        self.last_conn_id
    }

    pub fn create(
        &mut self,
        peer_id: PeerId,
        role: Role,
        conn_id: ConnectionId,
        link: Arc<dyn PeerLink>,
        callbacks: Option<CallCallbacks>,
    ) -> Result<&mut PeerEntry, CallError> {
        if self.entries.contains_key(&peer_id) {
            return Err(CallError::AlreadyConnected(format!(
                "connection entry for {} already exists",
                peer_id
            )));
        }
        let entry = PeerEntry::new(peer_id.clone(), role, conn_id, link, callbacks);
        Ok(self.entries.entry(peer_id).or_insert(entry))
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerEntry> {
        self.entries.get(peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut PeerEntry> {
        self.entries.get_mut(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.entries.contains_key(peer_id)
    }

    /// True when the entry exists, belongs to `conn_id` and was not hung up.
    pub fn is_current(&self, peer_id: &PeerId, conn_id: ConnectionId) -> bool {
        self.entries.get(peer_id).is_some_and(|entry| {
            entry.conn_id == conn_id
                && entry.lifecycle != Lifecycle::Cancelled
                && !entry.cancel.is_cancelled()
        })
    }

    /// Drop the entry along with its queued candidates and acceptance state.
    /// The returned entry still owns the underlying connection; the caller
    /// releases it.
    pub fn remove(&mut self, peer_id: &PeerId) -> Option<PeerEntry> {
        self.acceptance_pending.remove(peer_id);
        self.remote_candidates.clear(peer_id);

        let mut entry = self.entries.remove(peer_id)?;
        entry.lifecycle = Lifecycle::Cancelled;
        entry.cancel.cancel();
        entry.pending_candidates.clear();
        Some(entry)
    }

    /// Flip `media_started`. Returns the local candidates held back so far,
    /// or `None` if there is no entry or media had already started.
    pub fn mark_media_started(&mut self, peer_id: &PeerId) -> Option<Vec<IceCandidate>> {
        let entry = self.entries.get_mut(peer_id)?;
        if entry.media_started {
            return None;
        }
        entry.media_started = true;
        Some(std::mem::take(&mut entry.pending_candidates))
    }

    /// Returns true only on the first transition to `Established`.
    pub fn mark_established(&mut self, peer_id: &PeerId) -> bool {
        let Some(entry) = self.entries.get_mut(peer_id) else {
            return false;
        };
        if entry.lifecycle != Lifecycle::Negotiating {
            return false;
        }
        entry.lifecycle = Lifecycle::Established;
        entry.connected_at = Some(SystemTime::now());
        true
    }

    /// Hold a local candidate until media starts. Returns false without an
    /// entry to hold it on.
    pub fn hold_local_candidate(&mut self, peer_id: &PeerId, candidate: IceCandidate) -> bool {
        match self.entries.get_mut(peer_id) {
            Some(entry) => {
                entry.pending_candidates.push(candidate);
                true
            }
            None => false,
        }
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.entries.keys().cloned().collect()
    }

    /// Every peer with an entry or an unanswered offer, sorted.
    pub fn known_peers(&self) -> Vec<PeerId> {
        self.entries
            .keys()
            .chain(self.pending_offers.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn started_peer_ids(&self) -> Vec<PeerId> {
        self.entries
            .values()
            .filter(|entry| entry.media_started)
            .map(|entry| entry.peer_id.clone())
            .collect()
    }

    pub fn status(&self, peer_id: &PeerId) -> ConnectStatus {
        match self.entries.get(peer_id) {
            Some(entry) if entry.media_started => ConnectStatus::Connected,
            Some(_) => ConnectStatus::Connecting,
            None => ConnectStatus::NotConnected,
        }
    }

    pub fn summaries(&self) -> Vec<ConnectionSummary> {
        let mut summaries: Vec<_> = self
            .entries
            .values()
            .map(|entry| ConnectionSummary {
                peer_id: entry.peer_id.clone(),
                role: entry.role,
                lifecycle: entry.lifecycle,
                status: self.status(&entry.peer_id),
                connected_at: entry.connected_at,
            })
            .collect();
        summaries.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        summaries
    }

    pub fn insert_pending_offer(&mut self, peer_id: PeerId, offer: SessionDescription) {
        self.pending_offers.insert(peer_id, offer);
    }

    pub fn take_pending_offer(&mut self, peer_id: &PeerId) -> Option<SessionDescription> {
        self.pending_offers.remove(peer_id)
    }

    pub fn has_pending_offer(&self, peer_id: &PeerId) -> bool {
        self.pending_offers.contains_key(peer_id)
    }

    pub fn set_acceptance_pending(&mut self, peer_id: PeerId) {
        self.acceptance_pending.insert(peer_id);
    }

    pub fn clear_acceptance_pending(&mut self, peer_id: &PeerId) -> bool {
        self.acceptance_pending.remove(peer_id)
    }

    pub fn is_acceptance_pending(&self, peer_id: &PeerId) -> bool {
        self.acceptance_pending.contains(peer_id)
    }

    pub fn enqueue_remote_candidate(&mut self, peer_id: PeerId, candidate: IceCandidate) {
        self.remote_candidates.enqueue(peer_id, candidate);
    }

    pub fn drain_remote_candidates(&mut self, peer_id: &PeerId) -> Vec<IceCandidate> {
        self.remote_candidates.drain(peer_id)
    }

    pub fn clear_remote_candidates(&mut self, peer_id: &PeerId) {
        self.remote_candidates.clear(peer_id);
    }

    pub fn queued_remote_candidates(&self, peer_id: &PeerId) -> usize {
        self.remote_candidates.len(peer_id)
    }

    /// Forget everything without releasing connections; callers remove
    /// live entries first.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending_offers.clear();
        self.acceptance_pending.clear();
        self.remote_candidates.clear_all();
    }
}
