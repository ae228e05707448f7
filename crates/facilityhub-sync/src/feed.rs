//! Session feed — wires the broker connection to the sync components.
//!
//! One feed per signed-in session. It owns the subscription set: the
//! presence topic, the six per-user topics, and at most one room topic
//! that follows the chat selection. Every inbound event is routed to its
//! component first, then triggers the broad refetch of notifications and
//! room lists.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use facilityhub_core::types::RoomId;
use facilityhub_core::AppResult;
use facilityhub_entity::chat::{ChatEvent, ChatMessage};
use facilityhub_entity::presence::PresenceStatus;
use facilityhub_entity::session::Session;
use facilityhub_realtime::{topic, PresenceMap, RealtimeConnection, UserFeature};

use crate::{ChatSynchronizer, NotificationAggregator};

/// Kind of routing a dispatch loop applies to inbound bodies.
enum Route {
    /// User-status events merge into the presence map.
    Presence,
    /// Direct messages append to the inbox buffer.
    DirectMessage,
    /// Everything else is a notification push.
    Notification,
}

/// Wires one broker connection to the notification aggregator, the chat
/// synchronizer, and the presence map.
pub struct SessionFeed {
    session: Session,
    connection: Arc<RealtimeConnection>,
    notifications: Arc<NotificationAggregator>,
    chat: Arc<ChatSynchronizer>,
    presence: Arc<PresenceMap>,
    inbox: Arc<RwLock<Vec<ChatMessage>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    room_subscription: Mutex<Option<String>>,
}

impl SessionFeed {
    /// Attaches the feed to an open connection: subscribes the presence
    /// topic and the six per-user topics, starts their dispatch loops,
    /// announces online presence, and primes both components with a first
    /// fetch.
    pub async fn attach(
        connection: Arc<RealtimeConnection>,
        notifications: Arc<NotificationAggregator>,
        chat: Arc<ChatSynchronizer>,
        presence: Arc<PresenceMap>,
        session: Session,
    ) -> AppResult<Self> {
        let feed = Self {
            session,
            connection,
            notifications,
            chat,
            presence,
            inbox: Arc::new(RwLock::new(Vec::new())),
            tasks: Mutex::new(Vec::new()),
            room_subscription: Mutex::new(None),
        };

        let mut tasks = Vec::with_capacity(1 + UserFeature::ALL.len());

        let status = feed.connection.subscribe(topic::user_status()).await?;
        tasks.push(feed.spawn_dispatch(status.receiver, Route::Presence));

        for feature in UserFeature::ALL {
            let path = topic::for_user(feature, feed.session.user_id);
            let sub = feed.connection.subscribe(path).await?;
            let route = match feature {
                UserFeature::Messages => Route::DirectMessage,
                _ => Route::Notification,
            };
            tasks.push(feed.spawn_dispatch(sub.receiver, route));
        }

        feed.tasks.lock().await.extend(tasks);
        feed.connection.announce(PresenceStatus::Online);

        if let Err(e) = feed.notifications.refresh().await {
            warn!(error = %e, "Initial notification fetch failed");
        }
        if let Err(e) = feed.chat.refresh_rooms().await {
            warn!(error = %e, "Initial room list fetch failed");
        }

        info!(user_id = %feed.session.user_id, "Session feed attached");
        Ok(feed)
    }

    /// Spawns a dispatch loop over a subscription's receiver. The loop
    /// ends when the subscription is torn down or the connection closes.
    fn spawn_dispatch(
        &self,
        mut receiver: mpsc::Receiver<String>,
        route: Route,
    ) -> JoinHandle<()> {
        let notifications = self.notifications.clone();
        let chat = self.chat.clone();
        let presence = self.presence.clone();
        let inbox = self.inbox.clone();

        tokio::spawn(async move {
            while let Some(body) = receiver.recv().await {
                match route {
                    Route::Presence => presence.merge_event(&body),
                    Route::DirectMessage => match serde_json::from_str::<ChatMessage>(&body) {
                        Ok(message) => inbox.write().await.push(message),
                        Err(e) => warn!(error = %e, "Unparseable direct message dropped"),
                    },
                    Route::Notification => {
                        if let Err(e) = notifications.on_push(&body).await {
                            warn!(error = %e, "Unparseable notification push dropped");
                        }
                    }
                }

                // Every push invalidates broadly: refetch notifications and
                // both room lists regardless of which topic fired.
                if let Err(e) = notifications.refresh().await {
                    warn!(error = %e, "Notification refetch failed after push");
                }
                if let Err(e) = chat.refresh_rooms().await {
                    warn!(error = %e, "Room list refetch failed after push");
                }
            }
            debug!("Dispatch loop ended");
        })
    }

    /// Opens a chat room: selects it on the synchronizer, moves the room
    /// topic subscription to the new room, and starts its dispatch loop.
    /// The connection itself stays open across switches.
    pub async fn open_room(&self, room_id: RoomId) -> AppResult<()> {
        self.chat.select_room(room_id).await?;

        let mut current = self.room_subscription.lock().await;
        if let Some(old_id) = current.take() {
            self.connection.unsubscribe_id(&old_id).await;
        }

        let sub = self.connection.subscribe(topic::room(room_id)).await?;
        *current = Some(sub.id);
        drop(current);

        let chat = self.chat.clone();
        let mut receiver = sub.receiver;
        let handle = tokio::spawn(async move {
            while let Some(body) = receiver.recv().await {
                match ChatEvent::parse(&body) {
                    Ok(event) => {
                        if let Err(e) = chat.on_push(event).await {
                            warn!(error = %e, "Room refetch failed after push");
                        }
                    }
                    Err(e) => warn!(error = %e, "Unparseable room event dropped"),
                }
            }
        });
        self.tasks.lock().await.push(handle);

        Ok(())
    }

    /// Closes the active room: drops its subscription and clears the
    /// synchronizer's selection.
    pub async fn close_room(&self) {
        if let Some(old_id) = self.room_subscription.lock().await.take() {
            self.connection.unsubscribe_id(&old_id).await;
        }
        self.chat.deselect().await;
    }

    /// Pending notifications addressed to this session, for the badge.
    pub async fn unread_notifications(&self) -> usize {
        self.notifications.unread_count(&self.session).await
    }

    /// Unread chat messages across all rooms, as counted by the server.
    pub async fn unread_messages(&self) -> u32 {
        self.chat.unread_total().await
    }

    /// Direct messages received outside any open room, in arrival order.
    pub async fn inbox(&self) -> Vec<ChatMessage> {
        self.inbox.read().await.clone()
    }

    /// The presence map fed by this session's status topic.
    pub fn presence(&self) -> &PresenceMap {
        &self.presence
    }

    /// The underlying broker connection.
    pub fn connection(&self) -> &RealtimeConnection {
        &self.connection
    }

    /// Announces offline, closes the connection, and stops every dispatch
    /// loop.
    pub async fn shutdown(&self) {
        if let Some(old_id) = self.room_subscription.lock().await.take() {
            self.connection.unsubscribe_id(&old_id).await;
        }
        self.connection.close().await;
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        info!(user_id = %self.session.user_id, "Session feed shut down");
    }
}
