use crate::error::CallError;
use crate::media::MediaStream;
use crate::session::{CallSession, SessionEvent};
use parley_core::{PeerId, SignalMessage};
use tracing::{debug, error, info, warn};

impl CallSession {
    pub(super) fn needs_local_media(&self) -> bool {
        self.config.media.requires_local_media() && self.local_stream.is_none()
    }

    /// Start acquiring local media unless a request is already running.
    pub(super) fn request_local_media(&mut self) {
        if self.media_requested {
            return;
        }
        self.media_requested = true;

        let media = self.media.clone();
        let constraints = self.config.media;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = media.acquire_local_media(&constraints).await;
            let _ = tx.send(SessionEvent::MediaAcquired(result));
        });
    }

    /// Peers with a call or an answer waiting for local media.
    pub(super) fn deferred_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .deferred_answers
            .iter()
            .map(|(peer_id, _)| peer_id.clone())
            .chain(self.deferred_calls.iter().map(|(peer_id, _)| peer_id.clone()))
            .collect();
        peers.sort();
        peers.dedup();
        peers
    }

    /// Forget calls and answers to `peer_id` still waiting for local media.
    /// A forgotten call reports failure to its caller.
    pub(super) fn drop_deferred(&mut self, peer_id: &PeerId) -> bool {
        let answers = self.deferred_answers.len();
        self.deferred_answers.retain(|(deferred, _)| deferred != peer_id);
        let mut dropped = answers != self.deferred_answers.len();

        let (cancelled, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred_calls)
            .into_iter()
            .partition(|(deferred, _)| deferred == peer_id);
        self.deferred_calls = kept;
        for (_, callbacks) in cancelled {
            dropped = true;
            debug!("Dropping deferred call to {}", peer_id);
            callbacks.failure(CallError::System(format!(
                "call to {} was hung up before local media was ready",
                peer_id
            )));
        }
        dropped
    }

    pub(super) async fn handle_media_acquired(&mut self, result: Result<MediaStream, CallError>) {
        self.media_requested = false;
        let calls = std::mem::take(&mut self.deferred_calls);
        let answers = std::mem::take(&mut self.deferred_answers);

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                let err = match e {
                    CallError::Media(_) => e,
                    other => CallError::Media(other.to_string()),
                };
                error!("Failed to acquire local media: {}", err);

                for (_, callbacks) in calls {
                    if !callbacks.failure(err.clone()) {
                        self.listener.on_error(err.clone()).await;
                    }
                }
                for (peer_id, _) in answers {
                    if let Err(e) = self.signaling.send(Some(&peer_id), SignalMessage::Reject).await {
                        warn!("Reject to {} was not delivered: {}", peer_id, e);
                    }
                    self.registry.clear_remote_candidates(&peer_id);
                    self.listener.on_error(err.clone()).await;
                }
                return;
            }
        };

        info!("Local media ready ({})", stream.id);
        self.local_stream = Some(stream);

        debug!(
            "Replaying {} deferred answers and {} deferred calls",
            answers.len(),
            calls.len()
        );
        // Answers first: a call to a peer whose offer we already accepted
        // must find the responder entry and stand down.
        for (peer_id, offer) in answers {
            self.answer_offer(peer_id, offer).await;
        }
        for (peer_id, callbacks) in calls {
            self.start_call(peer_id, callbacks).await;
        }
    }
}
