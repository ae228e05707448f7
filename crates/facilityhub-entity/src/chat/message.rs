//! Chat message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facilityhub_core::types::{MessageId, RoomId, UserId};

/// A chat message. Delivered either in a history snapshot or as a push
/// event while the room is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: MessageId,
    /// Room the message belongs to.
    pub room_id: RoomId,
    /// Author.
    pub sender_id: UserId,
    /// Message text.
    #[serde(default)]
    pub body: String,
    /// Creation time; within a room, messages are ordered by this field
    /// ascending as delivered and must not be reordered on merge.
    pub created_at: DateTime<Utc>,
    /// Whether the message was deleted server-side.
    #[serde(default)]
    pub deleted: bool,
}
