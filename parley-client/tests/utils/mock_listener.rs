use async_trait::async_trait;
use parley_client::{AcceptDecision, CallError, MediaStream, SessionListener};
use parley_core::{OccupantInfo, OccupantList, PeerId};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hooks recorded by `RecordingListener`.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    AcceptCheck { peer_id: PeerId },
    StreamAcquired { peer_id: PeerId },
    StreamClosed { peer_id: PeerId },
    RoomOccupants {
        room: String,
        peers: Vec<PeerId>,
        self_info: Option<OccupantInfo>,
    },
    RoomEntry { entered: bool, room: String },
    CallCancelled { peer_id: PeerId, explicitly: bool },
    Error { code: String },
    Disconnect,
}

/// What `RecordingListener` does with incoming offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptPolicy {
    Accept,
    Reject,
    /// Keep the decision for the test to resolve.
    Hold,
}

/// A SessionListener that records every hook it receives.
#[derive(Clone)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ListenerEvent>>>,
    policy: AcceptPolicy,
    held: Arc<Mutex<Vec<AcceptDecision>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::with_policy(AcceptPolicy::Accept)
    }

    pub fn with_policy(policy: AcceptPolicy) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            policy,
            held: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn get_events(&self) -> Vec<ListenerEvent> {
        self.events.lock().await.clone()
    }

    pub async fn count(&self, pred: impl Fn(&ListenerEvent) -> bool) -> usize {
        self.events.lock().await.iter().filter(|e| pred(e)).count()
    }

    /// Wait until an event matching `pred` was recorded.
    pub async fn wait_for(&self, timeout_ms: u64, pred: impl Fn(&ListenerEvent) -> bool) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.events.lock().await.iter().any(&pred) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn stream_closed_count(&self, peer: &str) -> usize {
        let peer = PeerId::from(peer);
        self.count(|e| matches!(e, ListenerEvent::StreamClosed { peer_id } if *peer_id == peer))
            .await
    }

    /// Take the held decision for `peer`, if any.
    pub async fn take_held(&self, peer: &str) -> Option<AcceptDecision> {
        let peer = PeerId::from(peer);
        let mut held = self.held.lock().await;
        let index = held.iter().position(|d| *d.peer_id() == peer)?;
        Some(held.remove(index))
    }

    async fn record(&self, event: ListenerEvent) {
        tracing::info!("[RecordingListener] {:?}", event);
        self.events.lock().await.push(event);
    }
}

impl Default for RecordingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionListener for RecordingListener {
    async fn accept_check(&self, peer_id: PeerId, decision: AcceptDecision) {
        self.record(ListenerEvent::AcceptCheck { peer_id }).await;
        match self.policy {
            AcceptPolicy::Accept => decision.accept(),
            AcceptPolicy::Reject => decision.reject(),
            AcceptPolicy::Hold => self.held.lock().await.push(decision),
        }
    }

    async fn on_stream_acquired(&self, peer_id: PeerId, _stream: MediaStream) {
        self.record(ListenerEvent::StreamAcquired { peer_id }).await;
    }

    async fn on_stream_closed(&self, peer_id: PeerId) {
        self.record(ListenerEvent::StreamClosed { peer_id }).await;
    }

    async fn on_room_occupants(
        &self,
        room: String,
        occupants: OccupantList,
        self_info: Option<OccupantInfo>,
    ) {
        self.record(ListenerEvent::RoomOccupants {
            room,
            peers: occupants.into_keys().collect(),
            self_info,
        })
        .await;
    }

    async fn on_room_entry(&self, entered: bool, room: String) {
        self.record(ListenerEvent::RoomEntry { entered, room }).await;
    }

    async fn call_cancelled(&self, peer_id: PeerId, explicitly: bool) {
        self.record(ListenerEvent::CallCancelled {
            peer_id,
            explicitly,
        })
        .await;
    }

    async fn on_error(&self, error: CallError) {
        self.record(ListenerEvent::Error {
            code: error.code().to_owned(),
        })
        .await;
    }

    async fn on_disconnect(&self) {
        self.record(ListenerEvent::Disconnect).await;
    }
}
