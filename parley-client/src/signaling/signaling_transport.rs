use crate::error::SignalingError;
use async_trait::async_trait;
use parley_core::{PeerId, SignalMessage};

/// Outbound half of the relay channel. Inbound messages are fed to the
/// session as `Envelope`s through the receiver given to `CallSession::new`.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Deliver `message` to `target`, or to the relay itself when `target`
    /// is `None`. Resolves once the relay acknowledged or refused it.
    async fn send(&self, target: Option<&PeerId>, message: SignalMessage)
    -> Result<(), SignalingError>;
}
