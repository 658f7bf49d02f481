use crate::connection::{ConnectionId, LinkEvent};
use crate::media::{MediaStream, MediaType};
use crate::session::CallSession;
use parley_core::{IceCandidate, PeerId};
use tracing::{debug, info};

impl CallSession {
    pub(super) async fn handle_link_event(
        &mut self,
        peer_id: PeerId,
        conn_id: ConnectionId,
        event: LinkEvent,
    ) {
        if !self.registry.is_current(&peer_id, conn_id) {
            debug!("Dropping {:?} from stale connection #{} to {}", event, conn_id, peer_id);
            return;
        }

        match event {
            LinkEvent::CandidateDiscovered(candidate) => {
                self.handle_local_candidate(peer_id, candidate).await
            }
            LinkEvent::StreamAdded(stream) => self.handle_stream_added(peer_id, stream).await,
            LinkEvent::StreamRemoved => {
                let Some(entry) = self.registry.get_mut(&peer_id) else {
                    return;
                };
                if !entry.stream_open() {
                    return;
                }
                entry.stream_closed = true;
                entry.remote_stream = None;
                info!("Stream from {} closed", peer_id);
                self.listener.on_stream_closed(peer_id).await;
            }
        }
    }

    async fn handle_local_candidate(&mut self, peer_id: PeerId, candidate: IceCandidate) {
        if let Some(address) = candidate.relay_address() {
            self.turn_servers.insert(address.to_owned());
        }

        let started = self
            .registry
            .get(&peer_id)
            .is_some_and(|entry| entry.media_started);
        if started {
            self.send_local_candidate(&peer_id, candidate).await;
        } else {
            self.registry.hold_local_candidate(&peer_id, candidate);
        }
    }

    async fn handle_stream_added(&mut self, peer_id: PeerId, stream: MediaStream) {
        self.start_media(&peer_id).await;

        if let Some(entry) = self.registry.get_mut(&peer_id) {
            entry.remote_stream = Some(stream.clone());
        }
        if !self.registry.mark_established(&peer_id) {
            debug!("Connection to {} already established", peer_id);
            return;
        }

        let media_type = if self.config.media.requires_local_media() {
            MediaType::AudioVideo
        } else {
            MediaType::DataChannel
        };
        info!("Connected to {} ({})", peer_id, media_type);

        let callbacks = self
            .registry
            .get(&peer_id)
            .and_then(|entry| entry.callbacks.clone());
        if let Some(callbacks) = callbacks {
            callbacks.success(peer_id.clone(), media_type);
        }
        self.listener.on_stream_acquired(peer_id, stream).await;
    }
}
