use crate::error::CallError;
use crate::session::CallSession;
use parley_core::{Envelope, PeerId, SignalMessage};
use tracing::{debug, warn};

impl CallSession {
    pub(super) async fn handle_signal(&mut self, envelope: Envelope) {
        let Envelope {
            sender_peer_id,
            message,
            ..
        } = envelope;
        debug!("Received {} from {:?}", message.kind(), sender_peer_id);

        match message {
            SignalMessage::Token(token) => self.process_token(token).await,
            SignalMessage::IceConfig { ice_config } => self.process_ice_config(ice_config).await,
            SignalMessage::SessionData { session_data } => self.process_session_data(session_data),
            SignalMessage::RoomData { room_data } => self.process_room_data(room_data).await,
            SignalMessage::Error {
                error_code,
                error_text,
            } => {
                warn!("Relay reported {}: {}", error_code, error_text);
                self.listener
                    .on_error(CallError::Signaling {
                        code: error_code,
                        text: error_text,
                    })
                    .await;
            }
            peer_message => {
                let Some(caller) = sender_peer_id else {
                    warn!("Dropping {} without a sender", peer_message.kind());
                    return;
                };
                self.handle_peer_message(caller, peer_message).await;
            }
        }
    }

    async fn handle_peer_message(&mut self, caller: PeerId, message: SignalMessage) {
        match message {
            SignalMessage::Offer(offer) => self.handle_offer(caller, offer).await,
            SignalMessage::Answer(answer) => self.handle_answer(caller, answer).await,
            SignalMessage::Reject => self.handle_reject(caller).await,
            SignalMessage::Candidate(candidate) => {
                self.handle_remote_candidate(caller, candidate).await
            }
            SignalMessage::Hangup => self.handle_remote_hangup(caller).await,
            other => warn!("Ignoring {} sent by peer {}", other.kind(), caller),
        }
    }
}
