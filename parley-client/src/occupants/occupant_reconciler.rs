use parley_core::{OccupantInfo, OccupantList, PeerId, RoomStatus, RoomUpdate};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Occupant list of one room as handed to the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomReport {
    pub room: String,
    /// Everyone in the room except ourselves.
    pub occupants: OccupantList,
    /// Our own entry, when the relay listed it.
    pub self_info: Option<OccupantInfo>,
}

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// `(entered, room)` for every join or leave, in payload order.
    pub room_entries: Vec<(bool, String)>,
    /// One report per room whose roster changed.
    pub reports: Vec<RoomReport>,
}

/// Caches the relay's room rosters and works out which live connections no
/// longer have a peer behind them.
#[derive(Debug, Default)]
pub struct OccupantReconciler {
    self_id: Option<PeerId>,
    joined_rooms: BTreeSet<String>,
    rosters: BTreeMap<String, OccupantList>,
    room_fields: BTreeMap<String, Map<String, Value>>,
}

impl OccupantReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_self_id(&mut self, self_id: PeerId) {
        self.self_id = Some(self_id);
    }

    /// Merge one `roomData` payload into the cache.
    pub fn apply(&mut self, room_data: BTreeMap<String, RoomUpdate>) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        for (room, update) in room_data {
            match update.room_status {
                Some(RoomStatus::Join) => {
                    self.joined_rooms.insert(room.clone());
                    outcome.room_entries.push((true, room.clone()));
                }
                Some(RoomStatus::Leave) => {
                    self.joined_rooms.remove(&room);
                    self.rosters.remove(&room);
                    self.room_fields.remove(&room);
                    outcome.room_entries.push((false, room));
                    continue;
                }
                Some(RoomStatus::Update) | None => {}
            }

            if let Some(field) = update.field {
                self.room_fields.insert(room.clone(), field);
            }

            let roster_changed = if let Some(list) = update.client_list {
                self.rosters.insert(room.clone(), list);
                true
            } else if let Some(delta) = update.client_list_delta {
                let roster = self.rosters.entry(room.clone()).or_default();
                if let Some(updated) = delta.update_client {
                    roster.extend(updated);
                }
                if let Some(removed) = delta.remove_client {
                    for peer_id in removed.keys() {
                        roster.remove(peer_id);
                    }
                }
                true
            } else {
                false
            };

            if roster_changed {
                outcome.reports.push(self.report(&room));
            }
        }

        outcome
    }

    /// Peers in `candidates` that appear in none of the cached rosters.
    pub fn stale_peers(&self, candidates: impl IntoIterator<Item = PeerId>) -> Vec<PeerId> {
        candidates
            .into_iter()
            .filter(|peer_id| {
                !self
                    .rosters
                    .values()
                    .any(|roster| roster.contains_key(peer_id))
            })
            .collect()
    }

    pub fn occupants(&self, room: &str) -> Option<OccupantList> {
        self.rosters.get(room).map(|roster| self.without_self(roster))
    }

    /// The peer's username from any roster, falling back to its id.
    pub fn peer_name(&self, peer_id: &PeerId) -> String {
        self.rosters
            .values()
            .filter_map(|roster| roster.get(peer_id))
            .find_map(|info| info.username.clone())
            .unwrap_or_else(|| peer_id.to_string())
    }

    pub fn room_field(&self, room: &str, name: &str) -> Option<&Value> {
        self.room_fields.get(room)?.get(name)
    }

    pub fn joined_rooms(&self) -> impl Iterator<Item = &String> {
        self.joined_rooms.iter()
    }

    pub fn clear(&mut self) {
        self.self_id = None;
        self.joined_rooms.clear();
        self.rosters.clear();
        self.room_fields.clear();
    }

    fn report(&self, room: &str) -> RoomReport {
        let roster = self.rosters.get(room);
        RoomReport {
            room: room.to_owned(),
            occupants: roster.map(|r| self.without_self(r)).unwrap_or_default(),
            self_info: roster
                .zip(self.self_id.as_ref())
                .and_then(|(r, me)| r.get(me).cloned()),
        }
    }

    fn without_self(&self, roster: &OccupantList) -> OccupantList {
        roster
            .iter()
            .filter(|(peer_id, _)| Some(*peer_id) != self.self_id.as_ref())
            .map(|(peer_id, info)| (peer_id.clone(), info.clone()))
            .collect()
    }
}
