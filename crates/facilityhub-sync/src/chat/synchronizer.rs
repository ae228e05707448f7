//! Chat synchronizer — room list, per-room history, unread counts.
//!
//! The active room has two parallel buffers: the history snapshot from the
//! REST fetch and a push buffer of messages delivered while the room is
//! open. Rendering concatenates both in delivery order; the synchronizer
//! never merges them. Every inbound room event, deletion or not, forces a
//! full reload of rooms and history, trading efficiency for consistency.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use facilityhub_api::{chat::drain_private_rooms, ChatApi, RoomLists};
use facilityhub_core::types::{RoomId, UserId};
use facilityhub_core::{AppError, AppResult};
use facilityhub_entity::chat::{ChatEvent, ChatMessage, ChatRoom};

#[derive(Debug, Default)]
struct ChatState {
    private_rooms: Vec<ChatRoom>,
    group_rooms: Vec<ChatRoom>,
    selected: Option<RoomId>,
    history: Vec<ChatMessage>,
    pushed: Vec<ChatMessage>,
}

/// Synchronizes chat state with the backend.
pub struct ChatSynchronizer {
    api: Arc<dyn ChatApi>,
    page_size: u32,
    state: RwLock<ChatState>,
}

impl ChatSynchronizer {
    /// Creates a synchronizer over the chat collaborator.
    pub fn new(api: Arc<dyn ChatApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            state: RwLock::new(ChatState::default()),
        }
    }

    /// Fetches both room lists and replaces the held ones. The private
    /// list is paged and drained fully; unread counts come from the
    /// server and are never recomputed locally.
    pub async fn refresh_rooms(&self) -> AppResult<()> {
        let private_rooms = drain_private_rooms(self.api.as_ref(), self.page_size).await?;
        let group_rooms = self.api.get_chat_room_groups().await?;

        let mut state = self.state.write().await;
        state.private_rooms = private_rooms;
        state.group_rooms = group_rooms;
        Ok(())
    }

    /// Selects a room: clears both buffers, records the selection, and
    /// fetches the room's history. Switching rooms never leaks messages
    /// from the previous room.
    pub async fn select_room(&self, room_id: RoomId) -> AppResult<()> {
        {
            let mut state = self.state.write().await;
            state.selected = Some(room_id);
            state.history.clear();
            state.pushed.clear();
        }
        self.fetch_history(room_id).await
    }

    /// Clears the selection and both buffers.
    pub async fn deselect(&self) {
        let mut state = self.state.write().await;
        state.selected = None;
        state.history.clear();
        state.pushed.clear();
    }

    /// Fetches a room's history and applies it only if that room is still
    /// selected when the response arrives. In-flight fetches are never
    /// cancelled, so a stale response for a deselected room must be
    /// ignored here rather than contaminate the new room's buffer.
    async fn fetch_history(&self, room_id: RoomId) -> AppResult<()> {
        let messages = self.api.get_messages_by_room(room_id).await?;

        let mut state = self.state.write().await;
        if state.selected == Some(room_id) {
            state.history = messages;
        } else {
            debug!(room_id = %room_id, "Stale history response ignored");
        }
        Ok(())
    }

    /// Refreshes the history of the currently selected room, if any.
    pub async fn refresh_history(&self) -> AppResult<()> {
        let selected = self.state.read().await.selected;
        match selected {
            Some(room_id) => self.fetch_history(room_id).await,
            None => Ok(()),
        }
    }

    /// Handles an inbound event on the selected room's topic.
    ///
    /// A DELETE action invalidates: the push buffer is cleared and both
    /// history and rooms are reloaded. Any other action appends the
    /// message to the push buffer and forces the same dual reload so that
    /// unread counts and room ordering stay correct.
    pub async fn on_push(&self, event: ChatEvent) -> AppResult<()> {
        match event {
            ChatEvent::Delete => {
                self.state.write().await.pushed.clear();
                self.refresh_history().await?;
                self.refresh_rooms().await
            }
            ChatEvent::Message(message) => {
                {
                    let mut state = self.state.write().await;
                    if state.selected == Some(message.room_id) {
                        state.pushed.push(message);
                    } else {
                        debug!(room_id = %message.room_id, "Push for unselected room dropped");
                    }
                }
                self.refresh_rooms().await?;
                self.refresh_history().await
            }
        }
    }

    /// Creates a private room between two accounts and refreshes the room
    /// list. Backend errors are returned verbatim; nothing is retried.
    pub async fn create_private_room(&self, a: UserId, b: UserId) -> AppResult<ChatRoom> {
        let room = self.api.create_room_private(a, b).await?;
        self.refresh_rooms().await?;
        Ok(room)
    }

    /// Creates a group room and refreshes the room list.
    pub async fn create_group(&self, member_ids: &[UserId]) -> AppResult<ChatRoom> {
        let room = self.api.create_group_chat(member_ids).await?;
        self.refresh_rooms().await?;
        Ok(room)
    }

    /// Clears the selected room's history server-side.
    ///
    /// The push buffer is emptied optimistically before the call resolves
    /// so the UI reflects intent immediately. On failure the error is
    /// surfaced but the optimistic clear is not rolled back; the next
    /// snapshot reconciles the state.
    pub async fn clear_history(&self) -> AppResult<()> {
        let room_id = {
            let mut state = self.state.write().await;
            state.pushed.clear();
            state
                .selected
                .ok_or_else(|| AppError::internal("No room selected"))?
        };

        self.api.delete_chat_history(room_id).await?;
        self.refresh_history().await?;
        self.refresh_rooms().await
    }

    /// Marks the selected room's messages as read, then reloads rooms and
    /// history so the server-computed unread counts are reflected.
    pub async fn mark_room_read(&self) -> AppResult<()> {
        let room_id = {
            let mut state = self.state.write().await;
            state.pushed.clear();
            state
                .selected
                .ok_or_else(|| AppError::internal("No room selected"))?
        };

        self.api.change_status_message(room_id).await?;
        self.refresh_rooms().await?;
        self.refresh_history().await
    }

    /// Sum of server-reported unread counts across all rooms, feeding the
    /// chat badge.
    pub async fn unread_total(&self) -> u32 {
        let state = self.state.read().await;
        state
            .private_rooms
            .iter()
            .chain(state.group_rooms.iter())
            .map(|room| room.unread_count)
            .sum()
    }

    /// The currently selected room, if any.
    pub async fn selected(&self) -> Option<RoomId> {
        self.state.read().await.selected
    }

    /// The held room lists.
    pub async fn rooms(&self) -> RoomLists {
        let state = self.state.read().await;
        RoomLists {
            private_rooms: state.private_rooms.clone(),
            group_rooms: state.group_rooms.clone(),
        }
    }

    /// The fetched-history buffer of the selected room.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.state.read().await.history.clone()
    }

    /// The push-delivered buffer of the selected room.
    pub async fn pushed(&self) -> Vec<ChatMessage> {
        self.state.read().await.pushed.clone()
    }
}
