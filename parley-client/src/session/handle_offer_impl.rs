use crate::connection::ConnectionId;
use crate::error::CallError;
use crate::registry::Role;
use crate::session::{AcceptDecision, CallSession, SessionEvent};
use parley_core::{PeerId, SessionDescription, SignalMessage};
use tracing::{debug, error, info, warn};

impl CallSession {
    pub(super) async fn handle_offer(&mut self, caller: PeerId, offer: SessionDescription) {
        if self.registry.is_acceptance_pending(&caller) {
            // Both sides called each other. The side with the greater id
            // gives up its own offer and answers.
            let their_offer_wins = self.self_id.as_ref().is_some_and(|me| caller < *me);
            if !their_offer_wins {
                info!("Call collision with {}: keeping our offer", caller);
                return;
            }

            info!("Call collision with {}: answering their offer", caller);
            if let Some(entry) = self.registry.remove(&caller) {
                if let Some(callbacks) = &entry.callbacks {
                    callbacks.accepted(true, caller.clone());
                }
                entry.release().await;
            }
            self.answer_offer(caller, offer).await;
            return;
        }

        if self.registry.contains(&caller) {
            warn!("Ignoring offer from {}: a connection already exists", caller);
            return;
        }

        debug!("Offer from {} awaiting accept decision", caller);
        self.registry.insert_pending_offer(caller.clone(), offer);
        let decision = AcceptDecision::new(caller.clone(), self.event_tx.clone());
        self.listener.accept_check(caller, decision).await;
    }

    pub(super) async fn handle_accept_decided(&mut self, peer_id: PeerId, accepted: bool) {
        let Some(offer) = self.registry.take_pending_offer(&peer_id) else {
            debug!("Offer from {} is no longer pending", peer_id);
            return;
        };

        if accepted {
            info!("Accepted call from {}", peer_id);
            self.answer_offer(peer_id, offer).await;
            return;
        }

        info!("Rejected call from {}", peer_id);
        self.registry.clear_remote_candidates(&peer_id);
        if let Err(e) = self.signaling.send(Some(&peer_id), SignalMessage::Reject).await {
            warn!("Reject to {} was not delivered: {}", peer_id, e);
        }
    }

    /// Build a responder connection for `offer` and start creating the answer.
    pub(super) async fn answer_offer(&mut self, peer_id: PeerId, offer: SessionDescription) {
        if self.needs_local_media() {
            info!("Local media not ready, deferring answer to {}", peer_id);
            self.deferred_answers.push((peer_id, offer));
            self.request_local_media();
            return;
        }
        if self.registry.contains(&peer_id) {
            warn!("Cannot answer {}: a connection already exists", peer_id);
            return;
        }

        let conn_id = self.registry.next_connection_id();
        let link = match self.open_link(&peer_id, conn_id, Role::Responder).await {
            Ok(link) => link,
            Err(e) => {
                error!("Failed to create connection to {}: {}", peer_id, e);
                self.listener.on_error(e).await;
                return;
            }
        };
        let entry = match self
            .registry
            .create(peer_id.clone(), Role::Responder, conn_id, link, None)
        {
            Ok(entry) => entry,
            Err(e) => {
                self.listener.on_error(e).await;
                return;
            }
        };
        let link = entry.link.clone();
        let cancel = entry.cancel.clone();

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let answer = link.create_answer(&offer).await?;
                if !cancel.is_cancelled() {
                    link.set_local_description(&answer).await?;
                }
                Ok::<_, CallError>(answer)
            }
            .await;
            if cancel.is_cancelled() {
                return;
            }
            let _ = tx.send(SessionEvent::AnswerCreated {
                peer_id,
                conn_id,
                result,
            });
        });
    }

    pub(super) async fn handle_answer_created(
        &mut self,
        peer_id: PeerId,
        conn_id: ConnectionId,
        result: Result<SessionDescription, CallError>,
    ) {
        if !self.registry.is_current(&peer_id, conn_id) {
            debug!("Dropping answer for {}: call was hung up", peer_id);
            return;
        }

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to answer {}: {}", peer_id, e);
                self.fail_call(&peer_id, e).await;
                return;
            }
        };

        if let Err(e) = self
            .signaling
            .send(Some(&peer_id), SignalMessage::Answer(answer))
            .await
        {
            warn!("Answer to {} was not delivered: {}", peer_id, e);
            self.fail_call(&peer_id, e.into()).await;
            return;
        }

        info!("Answered call from {}", peer_id);
        self.start_media(&peer_id).await;
    }
}
