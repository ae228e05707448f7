//! Presence map — process-wide user online state.
//!
//! Updated solely by presence push events on the user-status topic. The
//! backend publishes either a single `{userId, status}` update or an
//! object mapping user ids to status strings; both are merged the same way.

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use facilityhub_core::types::UserId;
use facilityhub_entity::presence::{PresenceStatus, PresenceUpdate};

/// Mapping from user id to online state. Lifetime is the session; absent
/// entries read as offline.
#[derive(Debug, Default)]
pub struct PresenceMap {
    statuses: DashMap<UserId, PresenceStatus>,
}

impl PresenceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            statuses: DashMap::new(),
        }
    }

    /// Merges a raw presence event body into the map.
    pub fn merge_event(&self, raw: &str) {
        if let Ok(update) = serde_json::from_str::<PresenceUpdate>(raw) {
            self.statuses.insert(update.user_id, update.status);
            return;
        }

        // Map form: {"12": "online", "15": "offline"}.
        let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(raw) else {
            debug!("Unrecognized presence event dropped");
            return;
        };

        for (key, value) in entries {
            let (Ok(user_id), Some(status)) = (key.parse::<UserId>(), value.as_str()) else {
                continue;
            };
            let status = match status {
                "online" => PresenceStatus::Online,
                "offline" => PresenceStatus::Offline,
                _ => continue,
            };
            self.statuses.insert(user_id, status);
        }
    }

    /// Current status of a user; unknown users read as offline.
    pub fn status(&self, user_id: UserId) -> PresenceStatus {
        self.statuses
            .get(&user_id)
            .map(|entry| *entry.value())
            .unwrap_or(PresenceStatus::Offline)
    }

    /// Whether a user is currently online.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.status(user_id) == PresenceStatus::Online
    }

    /// Number of users currently online.
    pub fn online_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|entry| *entry.value() == PresenceStatus::Online)
            .count()
    }
}
