//! Shared test infrastructure: an in-process STOMP-over-WebSocket broker
//! stub and in-memory REST collaborator fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use facilityhub_api::{ChatApi, NotificationApi};
use facilityhub_core::types::{ListResult, MessageId, NotificationId, RoomId, UserId};
use facilityhub_core::AppResult;
use facilityhub_entity::chat::{ChatMessage, ChatRoom, RoomKind};
use facilityhub_entity::notification::Notification;
use facilityhub_entity::session::{Role, Session};
use facilityhub_realtime::stomp::{Command, Frame};

/// A client frame observed by the stub broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    Subscribe { id: String, destination: String },
    Unsubscribe { id: String },
    Send { destination: String, body: String },
    Disconnect,
}

enum PushCommand {
    Message { destination: String, body: String },
}

/// In-process broker stub. Accepts WebSocket connections sequentially,
/// answers CONNECT with CONNECTED, records client frames, and pushes
/// MESSAGE frames to subscribed destinations on request.
pub struct StubBroker {
    pub endpoint: String,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<BrokerEvent>>,
    push_tx: mpsc::UnboundedSender<PushCommand>,
}

impl StubBroker {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (push_tx, push_rx) = mpsc::unbounded_channel();

        tokio::spawn(serve(listener, event_tx, push_rx));

        Self {
            endpoint: format!("ws://{addr}/ws"),
            events: tokio::sync::Mutex::new(event_rx),
            push_tx,
        }
    }

    /// Pushes a MESSAGE frame to whatever subscription covers the
    /// destination. Queued until the client subscribes.
    pub fn push(&self, destination: &str, body: &str) {
        let _ = self.push_tx.send(PushCommand::Message {
            destination: destination.to_string(),
            body: body.to_string(),
        });
    }

    /// Next observed client frame, failing the test after two seconds.
    pub async fn next_event(&self) -> BrokerEvent {
        let mut events = self.events.lock().await;
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for a broker event")
            .expect("broker stub terminated")
    }

    /// Skips events until one satisfies the predicate.
    pub async fn wait_for(&self, predicate: impl Fn(&BrokerEvent) -> bool) -> BrokerEvent {
        loop {
            let event = self.next_event().await;
            if predicate(&event) {
                return event;
            }
        }
    }

    /// Waits until `count` subscriptions have been observed and returns
    /// their `(id, destination)` pairs.
    pub async fn wait_for_subscriptions(&self, count: usize) -> Vec<(String, String)> {
        let mut seen = Vec::new();
        while seen.len() < count {
            if let BrokerEvent::Subscribe { id, destination } = self.next_event().await {
                seen.push((id, destination));
            }
        }
        seen
    }
}

async fn serve(
    listener: TcpListener,
    event_tx: mpsc::UnboundedSender<BrokerEvent>,
    mut push_rx: mpsc::UnboundedReceiver<PushCommand>,
) {
    // Subscriptions persist across this stub's lifetime only within one
    // connection; undelivered pushes queue until a matching subscribe.
    while let Ok((stream, _)) = listener.accept().await {
        let Ok(mut ws) = accept_async(stream).await else {
            continue;
        };
        let mut subscriptions: HashMap<String, String> = HashMap::new();
        let mut pending: Vec<(String, String)> = Vec::new();

        loop {
            tokio::select! {
                inbound = ws.next() => {
                    let Some(Ok(Message::Text(text))) = inbound else {
                        break;
                    };
                    let Ok(frame) = Frame::parse(text.as_str()) else {
                        continue;
                    };
                    match frame.command {
                        Command::Connect => {
                            let connected = Frame::new(Command::Connected)
                                .header("version", "1.2")
                                .serialize();
                            if ws.send(Message::Text(connected.into())).await.is_err() {
                                break;
                            }
                        }
                        Command::Subscribe => {
                            let id = frame.get_header("id").unwrap_or_default().to_string();
                            let destination =
                                frame.get_header("destination").unwrap_or_default().to_string();
                            subscriptions.insert(destination.clone(), id.clone());

                            let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut pending)
                                .into_iter()
                                .partition(|(d, _)| *d == destination);
                            pending = waiting;
                            for (d, body) in ready {
                                if deliver(&mut ws, &id, &d, &body).await.is_err() {
                                    break;
                                }
                            }

                            let _ = event_tx.send(BrokerEvent::Subscribe { id, destination });
                        }
                        Command::Unsubscribe => {
                            let id = frame.get_header("id").unwrap_or_default().to_string();
                            subscriptions.retain(|_, v| *v != id);
                            let _ = event_tx.send(BrokerEvent::Unsubscribe { id });
                        }
                        Command::Send => {
                            let _ = event_tx.send(BrokerEvent::Send {
                                destination: frame
                                    .get_header("destination")
                                    .unwrap_or_default()
                                    .to_string(),
                                body: frame.body,
                            });
                        }
                        Command::Disconnect => {
                            let _ = event_tx.send(BrokerEvent::Disconnect);
                            break;
                        }
                        _ => {}
                    }
                }
                cmd = push_rx.recv() => {
                    let Some(PushCommand::Message { destination, body }) = cmd else {
                        break;
                    };
                    match subscriptions.get(&destination) {
                        Some(id) => {
                            let id = id.clone();
                            if deliver(&mut ws, &id, &destination, &body).await.is_err() {
                                break;
                            }
                        }
                        None => pending.push((destination, body)),
                    }
                }
            }
        }
    }
}

async fn deliver(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    subscription: &str,
    destination: &str,
    body: &str,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let frame = Frame::new(Command::Message)
        .header("subscription", subscription)
        .header("destination", destination)
        .header("message-id", "m-0")
        .body(body)
        .serialize();
    ws.send(Message::Text(frame.into())).await
}

pub fn session(user_id: i64) -> Session {
    Session::new(UserId::new(user_id), "Test User", Role::new("User"))
}

pub fn notification_json(id: i64, recipient: i64, payload: &str) -> String {
    serde_json::json!({
        "id": id,
        "status": "PENDING",
        "recipient": { "referenceId": recipient },
        "createdAt": "2024-03-01T10:00:00Z",
        "message": payload,
    })
    .to_string()
}

pub fn chat_message_json(id: i64, room_id: i64, sender: i64, body: &str) -> String {
    serde_json::json!({
        "id": id,
        "roomId": room_id,
        "senderId": sender,
        "body": body,
        "createdAt": "2024-03-01T10:05:00Z",
        "deleted": false,
    })
    .to_string()
}

/// Notification collaborator fake with a fetch counter.
#[derive(Default)]
pub struct FakeNotificationApi {
    pub notifications: Mutex<Vec<Notification>>,
    pub fetches: AtomicUsize,
}

#[async_trait]
impl NotificationApi for FakeNotificationApi {
    async fn get_all_notifications(&self) -> AppResult<Vec<Notification>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn read_notification(&self, _id: NotificationId) -> AppResult<()> {
        Ok(())
    }

    async fn read_notification_maintenance(&self, _id: NotificationId) -> AppResult<()> {
        Ok(())
    }
}

/// Chat collaborator fake with room/history fixtures and fetch counters.
#[derive(Default)]
pub struct FakeChatApi {
    pub private_rooms: Mutex<Vec<ChatRoom>>,
    pub histories: Mutex<HashMap<i64, Vec<ChatMessage>>>,
    pub room_fetches: AtomicUsize,
    pub history_fetches: AtomicUsize,
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn get_chat_room_users(
        &self,
        _page: u32,
        _page_size: u32,
    ) -> AppResult<ListResult<ChatRoom>> {
        self.room_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(ListResult {
            result: self.private_rooms.lock().unwrap().clone(),
            meta: None,
            has_more: false,
        })
    }

    async fn get_chat_room_groups(&self) -> AppResult<Vec<ChatRoom>> {
        Ok(Vec::new())
    }

    async fn get_messages_by_room(&self, room_id: RoomId) -> AppResult<Vec<ChatMessage>> {
        self.history_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(&room_id.into_inner())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_room_private(&self, _a: UserId, _b: UserId) -> AppResult<ChatRoom> {
        Ok(test_room(1))
    }

    async fn create_group_chat(&self, _member_ids: &[UserId]) -> AppResult<ChatRoom> {
        Ok(test_room(2))
    }

    async fn delete_chat_history(&self, _room_id: RoomId) -> AppResult<()> {
        Ok(())
    }

    async fn change_status_message(&self, _room_id: RoomId) -> AppResult<()> {
        Ok(())
    }
}

pub fn test_room(id: i64) -> ChatRoom {
    ChatRoom {
        id: RoomId::new(id),
        kind: RoomKind::Private,
        members: Vec::new(),
        unread_count: 0,
    }
}

pub fn test_message(id: i64, room_id: i64) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(id),
        room_id: RoomId::new(room_id),
        sender_id: UserId::new(1),
        body: format!("message {id}"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        deleted: false,
    }
}

/// Polls a predicate until it holds, failing the test after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within the deadline"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub fn broker_config(endpoint: &str) -> facilityhub_core::config::broker::BrokerConfig {
    facilityhub_core::config::broker::BrokerConfig {
        endpoint: endpoint.to_string(),
        connect_timeout_seconds: 2,
        channel_buffer_size: 64,
        reconnect: facilityhub_core::config::broker::ReconnectConfig {
            enabled: false,
            max_attempts: 1,
            base_delay_ms: 10,
            max_delay_ms: 20,
        },
    }
}
