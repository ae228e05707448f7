//! Presence entities.

use serde::{Deserialize, Serialize};

use facilityhub_core::types::UserId;

/// Online state of a user, updated solely by presence push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// The user has an open session.
    Online,
    /// The user disconnected or announced leaving.
    Offline,
}

impl PresenceStatus {
    /// Converts to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Body published to the presence destination and mirrored back on the
/// presence topic: `{userId, status}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    /// The user whose status changed.
    pub user_id: UserId,
    /// New status.
    pub status: PresenceStatus,
}
