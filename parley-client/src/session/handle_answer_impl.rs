use crate::registry::Role;
use crate::session::CallSession;
use parley_core::{PeerId, SessionDescription};
use tracing::{info, warn};

impl CallSession {
    pub(super) async fn handle_answer(&mut self, caller: PeerId, answer: SessionDescription) {
        let is_initiator = self
            .registry
            .get(&caller)
            .is_some_and(|entry| entry.role == Role::Initiator);
        if !is_initiator || !self.registry.clear_acceptance_pending(&caller) {
            warn!("Ignoring answer from {}: no outstanding offer", caller);
            return;
        }

        let Some((link, callbacks)) = self
            .registry
            .get(&caller)
            .map(|entry| (entry.link.clone(), entry.callbacks.clone()))
        else {
            return;
        };

        info!("{} accepted our call", caller);
        if let Some(callbacks) = &callbacks {
            callbacks.accepted(true, caller.clone());
        }

        // Our candidates go out before their description is applied; theirs
        // are applied only after.
        if let Some(held) = self.registry.mark_media_started(&caller) {
            for candidate in held {
                self.send_local_candidate(&caller, candidate).await;
            }
        }

        if let Err(e) = link.set_remote_description(&answer).await {
            warn!("Failed to apply answer from {}: {}", caller, e);
            self.fail_call(&caller, e).await;
            return;
        }

        self.flush_remote_candidates(&caller).await;
    }

    pub(super) async fn handle_reject(&mut self, caller: PeerId) {
        if !self.registry.is_acceptance_pending(&caller) {
            warn!("Ignoring reject from {}: no outstanding offer", caller);
            return;
        }

        info!("{} rejected our call", caller);
        if let Some(entry) = self.registry.remove(&caller) {
            if let Some(callbacks) = &entry.callbacks {
                callbacks.accepted(false, caller.clone());
            }
            entry.release().await;
        }
    }
}
