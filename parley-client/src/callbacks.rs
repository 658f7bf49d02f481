use crate::error::CallError;
use crate::media::MediaType;
use parley_core::PeerId;
use std::fmt;
use std::sync::Arc;

pub type SuccessFn = Arc<dyn Fn(PeerId, MediaType) + Send + Sync>;
pub type FailureFn = Arc<dyn Fn(CallError) + Send + Sync>;
pub type AcceptedFn = Arc<dyn Fn(bool, PeerId) + Send + Sync>;

/// Per-call callbacks supplied to `SessionHandle::call`.
///
/// * `on_success` fires once media (or the data channel) is flowing.
/// * `on_failure` fires on any error affecting the call.
/// * `on_accepted` fires once with the remote side's accept/reject verdict.
#[derive(Clone, Default)]
pub struct CallCallbacks {
    on_success: Option<SuccessFn>,
    on_failure: Option<FailureFn>,
    on_accepted: Option<AcceptedFn>,
}

impl CallCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(PeerId, MediaType) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(CallError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(f));
        self
    }

    pub fn on_accepted<F>(mut self, f: F) -> Self
    where
        F: Fn(bool, PeerId) + Send + Sync + 'static,
    {
        self.on_accepted = Some(Arc::new(f));
        self
    }

    pub(crate) fn success(&self, peer_id: PeerId, media: MediaType) {
        if let Some(f) = &self.on_success {
            f(peer_id, media);
        }
    }

    /// Returns false when no failure callback is attached.
    pub(crate) fn failure(&self, err: CallError) -> bool {
        match &self.on_failure {
            Some(f) => {
                f(err);
                true
            }
            None => false,
        }
    }

    pub(crate) fn accepted(&self, accepted: bool, peer_id: PeerId) {
        if let Some(f) = &self.on_accepted {
            f(accepted, peer_id);
        }
    }
}

impl fmt::Debug for CallCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("on_accepted", &self.on_accepted.is_some())
            .finish()
    }
}
