use crate::error::CallError;
use crate::session::CallSession;
use futures::future::join_all;
use parley_core::{PeerId, SignalMessage};
use tracing::{debug, info, warn};

impl CallSession {
    /// Hang up one peer and tell them. Does nothing if we have no state for
    /// the peer.
    pub(super) async fn hangup(&mut self, peer_id: &PeerId) {
        if !self.drop_peer(peer_id).await {
            debug!("Nothing to hang up with {}", peer_id);
            return;
        }
        info!("Hung up {}", peer_id);
        self.send_hangup(peer_id).await;
    }

    pub(super) async fn hangup_all(&mut self) {
        let mut peers = self.registry.known_peers();
        for peer_id in self.deferred_peers() {
            if !peers.contains(&peer_id) {
                peers.push(peer_id);
            }
        }
        let mut dropped = Vec::with_capacity(peers.len());
        for peer_id in peers {
            if self.drop_peer(&peer_id).await {
                dropped.push(peer_id);
            }
        }
        if dropped.is_empty() {
            return;
        }

        info!("Hanging up {} peers", dropped.len());
        join_all(dropped.iter().map(|peer_id| self.send_hangup(peer_id))).await;
    }

    pub(super) async fn handle_remote_hangup(&mut self, caller: PeerId) {
        info!("{} hung up", caller);
        let answer_deferred = self.deferred_answers.iter().any(|(peer_id, _)| *peer_id == caller);
        if self.registry.take_pending_offer(&caller).is_some() || answer_deferred {
            self.listener.call_cancelled(caller.clone(), true).await;
        }
        self.drop_peer(&caller).await;
    }

    /// The relay is gone: drop every call without signaling anyone.
    pub(super) async fn handle_transport_closed(&mut self) {
        warn!("Relay connection lost, dropping all calls");

        for peer_id in self.registry.known_peers() {
            self.drop_peer(&peer_id).await;
        }
        self.registry.clear();

        for (peer_id, callbacks) in std::mem::take(&mut self.deferred_calls) {
            debug!("Dropping deferred call to {}", peer_id);
            callbacks.failure(CallError::System("relay connection lost".into()));
        }
        self.deferred_answers.clear();

        self.occupants.clear();
        self.self_id = None;
        self.ice_servers = None;
        self.turn_servers.clear();
        self.session_fields.clear();

        self.listener.on_disconnect().await;
    }

    /// Local teardown: queued candidates, pending offer, work waiting for
    /// local media and the entry. Returns true if there was anything to drop.
    async fn drop_peer(&mut self, peer_id: &PeerId) -> bool {
        self.registry.clear_remote_candidates(peer_id);
        let had_offer = self.registry.take_pending_offer(peer_id).is_some();
        let had_deferred = self.drop_deferred(peer_id);

        let Some(entry) = self.registry.remove(peer_id) else {
            return had_offer || had_deferred;
        };
        let stream_open = entry.stream_open();
        entry.release().await;
        if stream_open {
            self.listener.on_stream_closed(peer_id.clone()).await;
        }
        true
    }

    async fn send_hangup(&self, peer_id: &PeerId) {
        if let Err(e) = self.signaling.send(Some(peer_id), SignalMessage::Hangup).await {
            debug!("Hangup to {} was not delivered: {}", peer_id, e);
        }
    }
}
