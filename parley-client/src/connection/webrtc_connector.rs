use crate::config::LinkConfig;
use crate::connection::{LinkEventSink, PeerConnector, PeerLink};
use crate::error::CallError;
use crate::media::MediaStream;
use anyhow::{Context, Result};
use async_trait::async_trait;
use parley_core::{IceCandidate, PeerId, SdpType, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

const DATA_CHANNEL_LABEL: &str = "parley";

/// `PeerConnector` backed by the `webrtc` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRtcConnector;

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn create_connection(
        &self,
        config: &LinkConfig,
        local_stream: Option<&MediaStream>,
        events: LinkEventSink,
    ) -> Result<Arc<dyn PeerLink>, CallError> {
        let link = WebRtcLink::new(config, local_stream, events)
            .await
            .map_err(system_error)?;
        Ok(Arc::new(link))
    }
}

pub struct WebRtcLink {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    _data_channel: Option<Arc<RTCDataChannel>>,
}

impl WebRtcLink {
    pub async fn new(
        config: &LinkConfig,
        local_stream: Option<&MediaStream>,
        events: LinkEventSink,
    ) -> Result<Self> {
        let peer_id = events.peer_id().clone();

        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        // Connected/failed transitions stand in for remote stream add/remove.
        let state_events = events.clone();
        let remote_stream = MediaStream::new(
            format!("{}-remote", peer_id),
            local_stream.is_some_and(|s| s.audio),
            local_stream.is_some_and(|s| s.video),
        );
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                let stream = remote_stream.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", events.peer_id(), s);
                    match s {
                        RTCPeerConnectionState::Connected => events.stream_added(stream),
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => events.stream_removed(),
                        _ => {}
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.candidate_discovered(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                });
            })
        }));

        if let Some(stream) = local_stream {
            if stream.audio {
                peer_connection
                    .add_transceiver_from_kind(RTPCodecType::Audio, None)
                    .await?;
            }
            if stream.video {
                peer_connection
                    .add_transceiver_from_kind(RTPCodecType::Video, None)
                    .await?;
            }
        }

        let data_channel = if config.data_channel && config.initiator {
            let dc = peer_connection
                .create_data_channel(DATA_CHANNEL_LABEL, None)
                .await?;
            debug!("Created data channel '{}' for {}", dc.label(), peer_id);
            Some(dc)
        } else {
            None
        };

        Ok(Self {
            peer_id,
            peer_connection,
            _data_channel: data_channel,
        })
    }

    fn to_rtc(desc: &SessionDescription) -> Result<RTCSessionDescription> {
        let rtc = match desc.sdp_type {
            SdpType::Offer => RTCSessionDescription::offer(desc.sdp.clone())?,
            SdpType::Answer => RTCSessionDescription::answer(desc.sdp.clone())?,
        };
        Ok(rtc)
    }

    async fn answer(&self, offer: &SessionDescription) -> Result<SessionDescription> {
        self.peer_connection
            .set_remote_description(Self::to_rtc(offer)?)
            .await
            .context("Failed to apply remote offer")?;
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }
}

#[async_trait]
impl PeerLink for WebRtcLink {
    async fn create_offer(&self) -> Result<SessionDescription, CallError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| CallError::System(format!("create offer for {}: {}", self.peer_id, e)))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, CallError> {
        self.answer(offer).await.map_err(system_error)
    }

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<(), CallError> {
        let rtc = Self::to_rtc(desc).map_err(system_error)?;
        self.peer_connection
            .set_local_description(rtc)
            .await
            .map_err(|e| CallError::System(e.to_string()))
    }

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<(), CallError> {
        let rtc = Self::to_rtc(desc).map_err(system_error)?;
        self.peer_connection
            .set_remote_description(rtc)
            .await
            .map_err(|e| CallError::System(e.to_string()))
    }

    async fn add_candidate(&self, candidate: &IceCandidate) -> Result<(), CallError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| CallError::System(e.to_string()))
    }

    async fn close(&self) -> Result<(), CallError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| CallError::System(e.to_string()))
    }
}

fn system_error(err: anyhow::Error) -> CallError {
    CallError::System(format!("{:#}", err))
}
