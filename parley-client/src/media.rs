use crate::config::MediaConstraints;
use crate::error::CallError;
use async_trait::async_trait;
use std::fmt;

/// Handle to a local or remote media stream. The bytes never pass through
/// the session; only the stream's identity and track kinds do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub id: String,
    pub audio: bool,
    pub video: bool,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, audio: bool, video: bool) -> Self {
        Self {
            id: id.into(),
            audio,
            video,
        }
    }
}

/// What a successful call carries, as reported to the success callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    AudioVideo,
    DataChannel,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::AudioVideo => "audiovideo",
            MediaType::DataChannel => "datachannel",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquires the local camera/microphone stream.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire_local_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream, CallError>;
}

/// Source for sessions that never share audio or video.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMediaSource;

#[async_trait]
impl MediaSource for NoMediaSource {
    async fn acquire_local_media(
        &self,
        _constraints: &MediaConstraints,
    ) -> Result<MediaStream, CallError> {
        Err(CallError::Media("no media source configured".into()))
    }
}
