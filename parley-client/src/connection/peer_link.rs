use crate::config::LinkConfig;
use crate::connection::LinkEventSink;
use crate::error::CallError;
use crate::media::MediaStream;
use async_trait::async_trait;
use parley_core::{IceCandidate, SessionDescription};
use std::sync::Arc;

/// Builds underlying peer connections.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Create a connection configured with `config`, carrying `local_stream`
    /// when one is given. Candidates and stream changes are reported through
    /// `events` for as long as the connection lives.
    async fn create_connection(
        &self,
        config: &LinkConfig,
        local_stream: Option<&MediaStream>,
        events: LinkEventSink,
    ) -> Result<Arc<dyn PeerLink>, CallError>;
}

/// One underlying peer connection.
#[async_trait]
pub trait PeerLink: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, CallError>;

    /// Apply `offer` as the remote description, then create the answer to it.
    async fn create_answer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, CallError>;

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<(), CallError>;

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<(), CallError>;

    async fn add_candidate(&self, candidate: &IceCandidate) -> Result<(), CallError>;

    async fn close(&self) -> Result<(), CallError>;
}
