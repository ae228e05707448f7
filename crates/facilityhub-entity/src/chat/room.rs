//! Chat room entity model.

use serde::{Deserialize, Serialize};

use facilityhub_core::types::{RoomId, UserId};

/// Kind of chat room. Private and group rooms come from separate
/// room-list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// One-to-one conversation.
    Private,
    /// Multi-member conversation.
    Group,
}

impl Default for RoomKind {
    fn default() -> Self {
        Self::Private
    }
}

/// A chat room as reported by the room-list snapshot. Membership is
/// immutable after creation; `unread_count` is server-computed and never
/// recomputed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    /// Unique room identifier.
    pub id: RoomId,
    /// Private or group.
    #[serde(default)]
    pub kind: RoomKind,
    /// Member user ids, in creation order.
    #[serde(default)]
    pub members: Vec<UserId>,
    /// Unread messages for the current user, as computed by the server.
    #[serde(default)]
    pub unread_count: u32,
}
