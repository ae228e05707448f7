//! Chat REST collaborator.

use async_trait::async_trait;
use serde::Serialize;

use facilityhub_core::types::{ListResult, RoomId, UserId};
use facilityhub_core::AppResult;
use facilityhub_entity::chat::{ChatMessage, ChatRoom, RoomKind};

use crate::client::ApiClient;

/// Private and group room lists, fetched from their separate endpoints.
#[derive(Debug, Clone, Default)]
pub struct RoomLists {
    /// One-to-one rooms, with server-computed unread counts.
    pub private_rooms: Vec<ChatRoom>,
    /// Group rooms.
    pub group_rooms: Vec<ChatRoom>,
}

/// Chat endpoints consumed by the synchronizer.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch one page of the private room list.
    async fn get_chat_room_users(&self, page: u32, page_size: u32)
        -> AppResult<ListResult<ChatRoom>>;

    /// Fetch the group room list.
    async fn get_chat_room_groups(&self) -> AppResult<Vec<ChatRoom>>;

    /// Fetch the full message history of a room.
    async fn get_messages_by_room(&self, room_id: RoomId) -> AppResult<Vec<ChatMessage>>;

    /// Create a private room between two accounts.
    async fn create_room_private(&self, a: UserId, b: UserId) -> AppResult<ChatRoom>;

    /// Create a group room over the given accounts.
    async fn create_group_chat(&self, member_ids: &[UserId]) -> AppResult<ChatRoom>;

    /// Delete the full history of a room.
    async fn delete_chat_history(&self, room_id: RoomId) -> AppResult<()>;

    /// Mark the room's messages as read for the current user.
    async fn change_status_message(&self, room_id: RoomId) -> AppResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePrivateRoomBody {
    account1_id: UserId,
    account2_id: UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupBody<'a> {
    account_ids: &'a [UserId],
}

/// HTTP implementation over [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: ApiClient,
}

impl HttpChatApi {
    /// Create the collaborator.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn get_chat_room_users(
        &self,
        page: u32,
        page_size: u32,
    ) -> AppResult<ListResult<ChatRoom>> {
        self.client
            .get(&format!(
                "/api/v1/chat/rooms/users?page={page}&pageSize={page_size}"
            ))
            .await
    }

    async fn get_chat_room_groups(&self) -> AppResult<Vec<ChatRoom>> {
        let list: ListResult<ChatRoom> = self.client.get("/api/v1/chat/rooms/groups").await?;
        // The group endpoint reports the same room shape; tag the kind here
        // so downstream code never guesses from the source endpoint.
        Ok(list
            .result
            .into_iter()
            .map(|mut room| {
                room.kind = RoomKind::Group;
                room
            })
            .collect())
    }

    async fn get_messages_by_room(&self, room_id: RoomId) -> AppResult<Vec<ChatMessage>> {
        let list: ListResult<ChatMessage> = self
            .client
            .get(&format!("/api/v1/chat/rooms/{room_id}/messages"))
            .await?;
        Ok(list.result)
    }

    async fn create_room_private(&self, a: UserId, b: UserId) -> AppResult<ChatRoom> {
        self.client
            .post(
                "/api/v1/chat/rooms/private",
                &CreatePrivateRoomBody {
                    account1_id: a,
                    account2_id: b,
                },
            )
            .await
    }

    async fn create_group_chat(&self, member_ids: &[UserId]) -> AppResult<ChatRoom> {
        let mut room: ChatRoom = self
            .client
            .post(
                "/api/v1/chat/rooms/group",
                &CreateGroupBody {
                    account_ids: member_ids,
                },
            )
            .await?;
        room.kind = RoomKind::Group;
        Ok(room)
    }

    async fn delete_chat_history(&self, room_id: RoomId) -> AppResult<()> {
        self.client
            .delete_ack(&format!("/api/v1/chat/rooms/{room_id}/messages"))
            .await
    }

    async fn change_status_message(&self, room_id: RoomId) -> AppResult<()> {
        self.client
            .post_ack(&format!("/api/v1/chat/rooms/{room_id}/read"))
            .await
    }
}

/// Drain every page of the private room list. The list endpoint is paged;
/// the console always holds the complete list.
pub async fn drain_private_rooms(api: &dyn ChatApi, page_size: u32) -> AppResult<Vec<ChatRoom>> {
    let mut rooms = Vec::new();
    let mut page = 1;

    loop {
        let batch = api.get_chat_room_users(page, page_size).await?;
        let len = batch.result.len();
        rooms.extend(batch.result);

        // A full page implies another one may follow; page_size 0 would
        // otherwise make every empty page look full.
        let full_page = page_size > 0 && len as u32 == page_size;
        if !(batch.has_more || full_page) {
            break;
        }
        page += 1;
    }

    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn room(id: i64) -> ChatRoom {
        ChatRoom {
            id: RoomId::new(id),
            kind: RoomKind::Private,
            members: Vec::new(),
            unread_count: 0,
        }
    }

    /// Serves `rooms` in `page_size`-sized pages, counting calls.
    struct PagedChatApi {
        rooms: Vec<ChatRoom>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatApi for PagedChatApi {
        async fn get_chat_room_users(
            &self,
            page: u32,
            page_size: u32,
        ) -> AppResult<ListResult<ChatRoom>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start = ((page - 1) * page_size) as usize;
            let end = (start + page_size as usize).min(self.rooms.len());
            let result = self.rooms.get(start..end).unwrap_or_default().to_vec();
            Ok(ListResult {
                result,
                meta: None,
                has_more: end < self.rooms.len(),
            })
        }

        async fn get_chat_room_groups(&self) -> AppResult<Vec<ChatRoom>> {
            Ok(Vec::new())
        }

        async fn get_messages_by_room(&self, _room_id: RoomId) -> AppResult<Vec<ChatMessage>> {
            Ok(Vec::new())
        }

        async fn create_room_private(&self, _a: UserId, _b: UserId) -> AppResult<ChatRoom> {
            Ok(room(1))
        }

        async fn create_group_chat(&self, _member_ids: &[UserId]) -> AppResult<ChatRoom> {
            Ok(room(2))
        }

        async fn delete_chat_history(&self, _room_id: RoomId) -> AppResult<()> {
            Ok(())
        }

        async fn change_status_message(&self, _room_id: RoomId) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_collects_every_page() {
        let api = PagedChatApi {
            rooms: (1..=5).map(room).collect(),
            calls: AtomicUsize::new(0),
        };

        let rooms = drain_private_rooms(&api, 2).await.unwrap();
        assert_eq!(rooms.len(), 5);
        // Two full pages, one final short page.
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drain_with_zero_page_size_terminates() {
        let api = PagedChatApi {
            rooms: Vec::new(),
            calls: AtomicUsize::new(0),
        };

        let rooms = drain_private_rooms(&api, 0).await.unwrap();
        assert!(rooms.is_empty());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }
}
