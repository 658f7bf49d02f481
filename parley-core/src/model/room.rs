use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Occupants of one room, keyed by peer.
pub type OccupantList = BTreeMap<PeerId, OccupantInfo>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_join_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
    /// Relay-defined fields we do not interpret.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OccupantInfo {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Join,
    Leave,
    Update,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_client: Option<OccupantList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_client: Option<BTreeMap<PeerId, Value>>,
}

/// Per-room payload of a `roomData` message: either a full occupant list or
/// a delta against the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_status: Option<RoomStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_list: Option<OccupantList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_list_delta: Option<ClientListDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Map<String, Value>>,
}

impl RoomUpdate {
    pub fn joined(client_list: OccupantList) -> Self {
        Self {
            room_status: Some(RoomStatus::Join),
            client_list: Some(client_list),
            ..Default::default()
        }
    }

    pub fn full(client_list: OccupantList) -> Self {
        Self {
            room_status: Some(RoomStatus::Update),
            client_list: Some(client_list),
            ..Default::default()
        }
    }

    pub fn delta(delta: ClientListDelta) -> Self {
        Self {
            room_status: Some(RoomStatus::Update),
            client_list_delta: Some(delta),
            ..Default::default()
        }
    }

    pub fn left() -> Self {
        Self {
            room_status: Some(RoomStatus::Leave),
            ..Default::default()
        }
    }
}
