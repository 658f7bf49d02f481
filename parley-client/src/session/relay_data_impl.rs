use crate::error::CallError;
use crate::session::CallSession;
use parley_core::{IceConfig, RoomUpdate, TokenData};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

impl CallSession {
    pub(super) async fn process_token(&mut self, token: TokenData) {
        info!("Signed in to relay as {}", token.peer_id);
        self.occupants.set_self_id(token.peer_id.clone());
        self.self_id = Some(token.peer_id);

        if let Some(ice_config) = token.ice_config {
            self.process_ice_config(ice_config).await;
        }
        if let Some(session_data) = token.session_data {
            self.process_session_data(session_data);
        }
        if let Some(room_data) = token.room_data {
            self.process_room_data(room_data).await;
        }
    }

    pub(super) async fn process_ice_config(&mut self, ice_config: IceConfig) {
        let mut servers = Vec::with_capacity(ice_config.ice_servers.len());
        self.turn_servers.clear();

        for server in ice_config.ice_servers {
            if server.is_turn() {
                if server.username.is_none() {
                    warn!("Dropping TURN server {:?}: no username", server.urls);
                    self.listener
                        .on_error(CallError::System(format!(
                            "TURN server {} has no username",
                            server.urls.join(",")
                        )))
                        .await;
                    continue;
                }
                self.turn_servers
                    .extend(server.urls.iter().filter_map(|url| turn_host(url)));
            }
            servers.push(server);
        }

        debug!("Using {} ICE servers from relay", servers.len());
        self.ice_servers = Some(servers);
    }

    pub(super) fn process_session_data(&mut self, session_data: Map<String, Value>) {
        self.session_fields.extend(session_data);
    }

    pub(super) async fn process_room_data(&mut self, room_data: BTreeMap<String, RoomUpdate>) {
        let outcome = self.occupants.apply(room_data);

        for (entered, room) in outcome.room_entries {
            self.listener.on_room_entry(entered, room).await;
        }

        if !outcome.reports.is_empty() {
            let stale = self
                .occupants
                .stale_peers(self.registry.started_peer_ids());
            for peer_id in stale {
                info!("{} is no longer in any room, dropping the call", peer_id);
                self.handle_remote_hangup(peer_id).await;
            }
        }

        for report in outcome.reports {
            self.listener
                .on_room_occupants(report.room, report.occupants, report.self_info)
                .await;
        }
    }
}

/// Host part of a `turn:`/`turns:` url.
fn turn_host(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("turn:")
        .or_else(|| url.strip_prefix("turns:"))?;
    let rest = rest.rsplit('@').next().unwrap_or(rest);
    let host = rest.split(['?', ':']).next().unwrap_or(rest);
    (!host.is_empty()).then(|| host.to_owned())
}
