use parley_core::IceServerConfig;
use parley_core::utils::default_stun_urls;

/// What the local side shares on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
    pub data: bool,
}

impl MediaConstraints {
    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
            data: false,
        }
    }

    pub fn data_only() -> Self {
        Self {
            audio: false,
            video: false,
            data: true,
        }
    }

    /// Calls cannot start until a local stream has been acquired.
    pub fn requires_local_media(&self) -> bool {
        self.audio || self.video
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::audio_video()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub media: MediaConstraints,
    /// Used until the relay pushes its own ICE configuration.
    pub ice_servers: Vec<IceServerConfig>,
    pub command_capacity: usize,
}

impl SessionConfig {
    pub fn with_media(mut self, media: MediaConstraints) -> Self {
        self.media = media;
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            media: MediaConstraints::default(),
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
            command_capacity: 64,
        }
    }
}

/// Parameters for one underlying connection.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub initiator: bool,
    pub data_channel: bool,
}
