use crate::model::peer::PeerId;
use crate::model::room::RoomUpdate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn is_turn(&self) -> bool {
        self.urls
            .iter()
            .any(|url| url.starts_with("turn:") || url.starts_with("turns:"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }

    /// Address of the relay for `typ relay` candidates.
    pub fn relay_address(&self) -> Option<&str> {
        if !self.candidate.contains("typ relay") {
            return None;
        }
        // candidate:<foundation> <component> <udp|tcp> <priority> <address> <port> typ relay ...
        let mut parts = self.candidate.split_whitespace();
        parts.position(|part| part.eq_ignore_ascii_case("udp") || part.eq_ignore_ascii_case("tcp"))?;
        parts.nth(1)
    }
}

/// Sent by the relay once the client is authenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub peer_id: PeerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_config: Option<IceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_data: Option<BTreeMap<String, RoomUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msgType", content = "msgData", rename_all = "camelCase")]
pub enum SignalMessage {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Reject,
    Candidate(IceCandidate),
    Hangup,
    #[serde(rename_all = "camelCase")]
    SessionData {
        session_data: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    RoomData {
        room_data: BTreeMap<String, RoomUpdate>,
    },
    #[serde(rename_all = "camelCase")]
    IceConfig {
        ice_config: IceConfig,
    },
    Token(TokenData),
    #[serde(rename_all = "camelCase")]
    Error {
        error_code: String,
        error_text: String,
    },
}

impl SignalMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Offer(_) => "offer",
            SignalMessage::Answer(_) => "answer",
            SignalMessage::Reject => "reject",
            SignalMessage::Candidate(_) => "candidate",
            SignalMessage::Hangup => "hangup",
            SignalMessage::SessionData { .. } => "sessionData",
            SignalMessage::RoomData { .. } => "roomData",
            SignalMessage::IceConfig { .. } => "iceConfig",
            SignalMessage::Token(_) => "token",
            SignalMessage::Error { .. } => "error",
        }
    }
}

/// One message on the relay channel together with its routing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_peer_id: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_peer_id: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_room: Option<String>,
    pub message: SignalMessage,
}

impl Envelope {
    pub fn from_peer(sender: PeerId, message: SignalMessage) -> Self {
        Self {
            sender_peer_id: Some(sender),
            target_peer_id: None,
            target_room: None,
            message,
        }
    }

    pub fn from_server(message: SignalMessage) -> Self {
        Self {
            sender_peer_id: None,
            target_peer_id: None,
            target_room: None,
            message,
        }
    }
}
