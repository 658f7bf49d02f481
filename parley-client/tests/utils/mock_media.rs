use async_trait::async_trait;
use parley_client::{CallError, MediaConstraints, MediaSource, MediaStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock MediaSource with a configurable outcome and latency.
#[derive(Clone, Default)]
pub struct MockMediaSource {
    fail: bool,
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// How many times local media was requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn acquire_local_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream, CallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail {
            return Err(CallError::Media("camera unavailable".into()));
        }
        Ok(MediaStream::new(
            "local",
            constraints.audio,
            constraints.video,
        ))
    }
}
