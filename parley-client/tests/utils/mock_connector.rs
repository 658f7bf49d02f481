use async_trait::async_trait;
use parley_client::{CallError, LinkConfig, LinkEventSink, MediaStream, PeerConnector, PeerLink};
use parley_core::{IceCandidate, PeerId, SessionDescription};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How links built by a `MockConnector` behave.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkBehavior {
    /// Raise `StreamAdded` once both descriptions are set and the first
    /// remote candidate arrives.
    pub auto_connect: bool,
    /// Local candidates to emit when the local description is applied.
    pub local_candidates: usize,
    pub fail_connect: bool,
    pub fail_offer: bool,
    /// How long offer and answer creation take (ms).
    pub negotiation_delay_ms: u64,
}

impl LinkBehavior {
    /// Links that connect on their own, for sessions talking to each other.
    pub fn auto() -> Self {
        Self {
            auto_connect: true,
            local_candidates: 1,
            ..Default::default()
        }
    }
}

/// What the session did to a `MockLink` so far.
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    pub local: Option<SessionDescription>,
    pub remote: Option<SessionDescription>,
    pub added: Vec<IceCandidate>,
    pub connected: bool,
    pub closed: bool,
}

/// Mock PeerConnector that keeps every link it built.
#[derive(Clone, Default)]
pub struct MockConnector {
    behavior: LinkBehavior,
    links: Arc<Mutex<Vec<Arc<MockLink>>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: LinkBehavior) -> Self {
        Self {
            behavior,
            links: Arc::default(),
        }
    }

    /// Every link built for `peer`, oldest first.
    pub fn links_for(&self, peer: &str) -> Vec<Arc<MockLink>> {
        let peer = PeerId::from(peer);
        self.links
            .lock()
            .unwrap()
            .iter()
            .filter(|link| link.peer_id == peer)
            .cloned()
            .collect()
    }

    pub fn last_link(&self, peer: &str) -> Option<Arc<MockLink>> {
        self.links_for(peer).pop()
    }

    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl PeerConnector for MockConnector {
    async fn create_connection(
        &self,
        config: &LinkConfig,
        local_stream: Option<&MediaStream>,
        events: LinkEventSink,
    ) -> Result<Arc<dyn PeerLink>, CallError> {
        if self.behavior.fail_connect {
            return Err(CallError::System("mock connector refused".into()));
        }

        let link = Arc::new(MockLink {
            peer_id: events.peer_id().clone(),
            config: config.clone(),
            local_stream: local_stream.cloned(),
            behavior: self.behavior,
            events,
            state: Mutex::new(LinkState::default()),
        });
        self.links.lock().unwrap().push(link.clone());
        Ok(link)
    }
}

/// A PeerLink that records its calls and lets tests raise link events.
pub struct MockLink {
    pub peer_id: PeerId,
    pub config: LinkConfig,
    pub local_stream: Option<MediaStream>,
    behavior: LinkBehavior,
    events: LinkEventSink,
    state: Mutex<LinkState>,
}

impl MockLink {
    pub fn state(&self) -> LinkState {
        self.state.lock().unwrap().clone()
    }

    pub fn added_candidates(&self) -> Vec<String> {
        self.state()
            .added
            .into_iter()
            .map(|c| c.candidate)
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Report a local candidate as the real connection would.
    pub fn emit_candidate(&self, candidate: &str) {
        self.events.candidate_discovered(IceCandidate::new(candidate));
    }

    pub fn emit_stream_added(&self) {
        self.events
            .stream_added(MediaStream::new(format!("remote-{}", self.peer_id), true, true));
    }

    pub fn emit_stream_removed(&self) {
        self.events.stream_removed();
    }

    async fn negotiation_delay(&self) {
        if self.behavior.negotiation_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.behavior.negotiation_delay_ms)).await;
        }
    }
}

#[async_trait]
impl PeerLink for MockLink {
    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        self.negotiation_delay().await;
        if self.behavior.fail_offer {
            return Err(CallError::System("mock offer failure".into()));
        }
        Ok(SessionDescription::offer(format!("offer-for-{}", self.peer_id)))
    }

    async fn create_answer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, CallError> {
        self.state.lock().unwrap().remote = Some(offer.clone());
        self.negotiation_delay().await;
        Ok(SessionDescription::answer(format!("answer-for-{}", self.peer_id)))
    }

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<(), CallError> {
        self.state.lock().unwrap().local = Some(desc.clone());
        for n in 0..self.behavior.local_candidates {
            self.emit_candidate(&format!(
                "candidate:{} 1 udp {} 10.0.0.{} 5000 typ host",
                self.peer_id, n, n
            ));
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<(), CallError> {
        self.state.lock().unwrap().remote = Some(desc.clone());
        Ok(())
    }

    async fn add_candidate(&self, candidate: &IceCandidate) -> Result<(), CallError> {
        let connect = {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return Err(CallError::System("link closed".into()));
            }
            state.added.push(candidate.clone());
            let ready = state.local.is_some() && state.remote.is_some() && !state.connected;
            if self.behavior.auto_connect && ready {
                state.connected = true;
                true
            } else {
                false
            }
        };
        if connect {
            self.emit_stream_added();
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), CallError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}
