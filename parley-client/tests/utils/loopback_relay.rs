use async_trait::async_trait;
use parley_client::{SignalingError, SignalingTransport};
use parley_core::{Envelope, PeerId, SignalMessage, TokenData};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// In-memory relay routing peer messages between sessions in one test.
#[derive(Clone, Default)]
pub struct LoopbackRelay {
    routes: Arc<Mutex<HashMap<PeerId, mpsc::Sender<Envelope>>>>,
}

impl LoopbackRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `peer` and return the inbound channel for its session,
    /// already carrying its token.
    pub async fn register(&self, peer: &str) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(256);
        let peer_id = PeerId::from(peer);
        let token = SignalMessage::Token(TokenData {
            peer_id: peer_id.clone(),
            ice_config: None,
            room_data: None,
            session_data: None,
        });
        let _ = tx.send(Envelope::from_server(token)).await;
        self.routes.lock().await.insert(peer_id, tx);
        rx
    }

    /// The transport `peer`'s session sends through.
    pub fn transport_for(&self, peer: &str) -> RelayTransport {
        RelayTransport {
            from: PeerId::from(peer),
            relay: self.clone(),
        }
    }
}

/// SignalingTransport of one registered peer.
pub struct RelayTransport {
    from: PeerId,
    relay: LoopbackRelay,
}

#[async_trait]
impl SignalingTransport for RelayTransport {
    async fn send(
        &self,
        target: Option<&PeerId>,
        message: SignalMessage,
    ) -> Result<(), SignalingError> {
        let Some(target) = target else {
            return Ok(());
        };
        tracing::debug!("[LoopbackRelay] {} -> {}: {}", self.from, target, message.kind());

        let tx = self.relay.routes.lock().await.get(target).cloned();
        let Some(tx) = tx else {
            return Err(SignalingError::new("NO_SUCH_PEER", format!("{} is not connected", target)));
        };
        tx.send(Envelope::from_peer(self.from.clone(), message))
            .await
            .map_err(|_| SignalingError::new("NO_SUCH_PEER", format!("{} went away", target)))
    }
}
