//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facilityhub_core::types::{NotificationId, UserId};

use super::payload::NotificationPayload;

/// Lifecycle state of a notification. The transition is one-directional:
/// `Pending` → `Read`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    /// Delivered but not yet read.
    Pending,
    /// Acknowledged by the user.
    Read,
}

/// The recipient reference attached to a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// The user this notification is addressed to.
    pub reference_id: UserId,
}

/// A notification delivered to the console, either as part of a snapshot
/// fetch or as a push event. Created server-side; the console only ever
/// flips `status` to `Read`, and never deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Lifecycle state.
    pub status: NotificationStatus,
    /// Addressee.
    pub recipient: Recipient,
    /// Creation time; snapshot ordering key.
    pub created_at: DateTime<Utc>,
    /// JSON-encoded payload string as sent by the backend.
    #[serde(default)]
    pub message: Option<String>,
}

impl Notification {
    /// Whether this notification has not been read yet.
    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }

    /// Decode the loosely-typed payload into its tagged form.
    pub fn payload(&self) -> NotificationPayload {
        self.message
            .as_deref()
            .map(NotificationPayload::parse)
            .unwrap_or(NotificationPayload::Unknown)
    }
}
