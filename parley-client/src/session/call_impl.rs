use crate::callbacks::CallCallbacks;
use crate::connection::ConnectionId;
use crate::error::CallError;
use crate::registry::Role;
use crate::session::{CallSession, SessionEvent};
use parley_core::{PeerId, SessionDescription, SignalMessage};
use tracing::{debug, error, info, warn};

impl CallSession {
    pub(super) async fn handle_call(
        &mut self,
        peer_id: PeerId,
        callbacks: CallCallbacks,
    ) -> Result<(), CallError> {
        let Some(self_id) = &self.self_id else {
            return Err(CallError::Developer(
                "cannot call before the relay assigned an id".into(),
            ));
        };
        if *self_id == peer_id {
            return Err(CallError::Developer("cannot call yourself".into()));
        }

        if self.needs_local_media() {
            info!("Local media not ready, deferring call to {}", peer_id);
            self.deferred_calls.push((peer_id, callbacks));
            self.request_local_media();
            return Ok(());
        }

        self.start_call(peer_id, callbacks).await;
        Ok(())
    }

    pub(super) async fn start_call(&mut self, peer_id: PeerId, callbacks: CallCallbacks) {
        // They called us first; answer their offer instead of sending ours.
        if let Some(offer) = self.registry.take_pending_offer(&peer_id) {
            info!("{} already offered a call, answering it", peer_id);
            callbacks.accepted(true, peer_id.clone());
            self.listener.call_cancelled(peer_id.clone(), false).await;
            self.answer_offer(peer_id, offer).await;
            return;
        }

        if self.registry.is_acceptance_pending(&peer_id) {
            callbacks.failure(CallError::AlreadyConnected(format!(
                "call to {} is waiting for acceptance",
                peer_id
            )));
            return;
        }
        if self.registry.contains(&peer_id) {
            callbacks.failure(CallError::AlreadyConnected(format!(
                "already connected to {}",
                peer_id
            )));
            return;
        }

        let conn_id = self.registry.next_connection_id();
        let link = match self.open_link(&peer_id, conn_id, Role::Initiator).await {
            Ok(link) => link,
            Err(e) => {
                error!("Failed to create connection to {}: {}", peer_id, e);
                callbacks.failure(e);
                return;
            }
        };

        let entry = match self.registry.create(
            peer_id.clone(),
            Role::Initiator,
            conn_id,
            link,
            Some(callbacks.clone()),
        ) {
            Ok(entry) => entry,
            Err(e) => {
                callbacks.failure(e);
                return;
            }
        };
        let link = entry.link.clone();
        let cancel = entry.cancel.clone();
        self.registry.set_acceptance_pending(peer_id.clone());

        info!("Calling {}", peer_id);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let offer = link.create_offer().await?;
                if !cancel.is_cancelled() {
                    link.set_local_description(&offer).await?;
                }
                Ok::<_, CallError>(offer)
            }
            .await;
            if cancel.is_cancelled() {
                return;
            }
            let _ = tx.send(SessionEvent::OfferCreated {
                peer_id,
                conn_id,
                result,
            });
        });
    }

    pub(super) async fn handle_offer_created(
        &mut self,
        peer_id: PeerId,
        conn_id: ConnectionId,
        result: Result<SessionDescription, CallError>,
    ) {
        if !self.registry.is_current(&peer_id, conn_id) {
            debug!("Dropping offer for {}: call was hung up", peer_id);
            return;
        }

        let offer = match result {
            Ok(offer) => offer,
            Err(e) => {
                error!("Failed to create offer for {}: {}", peer_id, e);
                self.fail_call(&peer_id, e).await;
                return;
            }
        };

        match self
            .signaling
            .send(Some(&peer_id), SignalMessage::Offer(offer))
            .await
        {
            Ok(()) => debug!("Sent offer to {}", peer_id),
            Err(e) => {
                warn!("Offer to {} was not delivered: {}", peer_id, e);
                self.fail_call(&peer_id, e.into()).await;
            }
        }
    }

    /// Tear down a call that cannot proceed and report why.
    pub(super) async fn fail_call(&mut self, peer_id: &PeerId, err: CallError) {
        self.report_failure(peer_id, err).await;
        if let Some(entry) = self.registry.remove(peer_id) {
            entry.release().await;
        }
    }
}
