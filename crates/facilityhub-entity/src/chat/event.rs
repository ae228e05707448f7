//! Chat push events delivered on a room topic.

use serde::Deserialize;

use facilityhub_core::{AppError, AppResult};

use super::message::ChatMessage;

/// An inbound event on a room topic, dispatched on its `action` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// The room's history was deleted; buffers must be invalidated.
    Delete,
    /// A message event (new message or any non-delete action).
    Message(ChatMessage),
}

#[derive(Deserialize)]
struct ActionTag {
    #[serde(default)]
    action: Option<String>,
}

impl ChatEvent {
    /// Parse a raw room-topic body. The `action` tag decides the variant;
    /// everything except `"DELETE"` is treated as a message event.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let tag: ActionTag = serde_json::from_str(raw)?;
        if tag.action.as_deref() == Some("DELETE") {
            return Ok(Self::Delete);
        }

        let message: ChatMessage = serde_json::from_str(raw).map_err(AppError::from)?;
        Ok(Self::Message(message))
    }
}
