//! Notification aggregator — holds the ordered notification list.
//!
//! The REST snapshot is the source of truth: `refresh` fully replaces the
//! held list, sorted by creation time descending. Push events are appended
//! immediately so the UI never waits on the refresh; a brief duplicate may
//! exist until the next snapshot supersedes it. Duplicates are eliminated
//! by snapshot replacement, not explicit dedup.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use facilityhub_api::NotificationApi;
use facilityhub_core::types::NotificationId;
use facilityhub_core::{AppError, AppResult};
use facilityhub_entity::notification::Notification;
use facilityhub_entity::session::Session;

/// Aggregates notifications for the current user.
pub struct NotificationAggregator {
    api: Arc<dyn NotificationApi>,
    held: RwLock<Vec<Notification>>,
}

impl NotificationAggregator {
    /// Creates an aggregator over the notification collaborator.
    pub fn new(api: Arc<dyn NotificationApi>) -> Self {
        Self {
            api,
            held: RwLock::new(Vec::new()),
        }
    }

    /// Fetches the snapshot and replaces the held list, newest first.
    ///
    /// Safe to run overlapping: each completed fetch fully replaces the
    /// list, so the last response to arrive wins.
    pub async fn refresh(&self) -> AppResult<()> {
        let mut snapshot = self.api.get_all_notifications().await?;
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let count = snapshot.len();
        *self.held.write().await = snapshot;
        debug!(count, "Notification snapshot replaced");
        Ok(())
    }

    /// Appends a push-delivered notification to the held list immediately,
    /// ahead of the refresh the push also triggers.
    pub async fn on_push(&self, raw: &str) -> AppResult<()> {
        let notification: Notification = serde_json::from_str(raw)?;
        self.held.write().await.push(notification);
        Ok(())
    }

    /// Marks a notification as read.
    ///
    /// The backend models general and maintenance notifications as two
    /// resource kinds sharing the displayed list, so both acknowledgement
    /// calls are issued concurrently. Either succeeding counts as success
    /// and triggers a snapshot refresh; if both fail, held state is left
    /// untouched and no refresh happens.
    pub async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        let (general, maintenance) = tokio::join!(
            self.api.read_notification(id),
            self.api.read_notification_maintenance(id),
        );

        match (general, maintenance) {
            (Err(e1), Err(e2)) => Err(AppError::request(format!(
                "Failed to mark notification {id} as read: {e1}; {e2}"
            ))),
            (general, maintenance) => {
                if let Err(e) = general.and(maintenance) {
                    // One of the two kinds rejected the ack; the other
                    // accepted it, which is success by contract.
                    warn!(notification_id = %id, error = %e, "Partial read acknowledgement");
                }
                self.refresh().await
            }
        }
    }

    /// Count feeding the unread badge: pending notifications addressed to
    /// this user, or all pending ones when the user holds a technician
    /// role.
    pub async fn unread_count(&self, session: &Session) -> usize {
        self.held
            .read()
            .await
            .iter()
            .filter(|n| {
                n.is_pending()
                    && (n.recipient.reference_id == session.user_id
                        || session.role.is_technician())
            })
            .count()
    }

    /// The currently held list, for rendering.
    pub async fn snapshot(&self) -> Vec<Notification> {
        self.held.read().await.clone()
    }
}
