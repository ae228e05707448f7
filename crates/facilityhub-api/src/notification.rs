//! Notification REST collaborator.

use async_trait::async_trait;

use facilityhub_core::types::{ListResult, NotificationId};
use facilityhub_core::AppResult;
use facilityhub_entity::notification::Notification;

use crate::client::ApiClient;

/// Notification endpoints consumed by the aggregator.
///
/// The backend models general and maintenance notifications as two resource
/// kinds sharing one displayed list, hence the two read-acknowledgement
/// calls.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Fetch all notifications for the current user.
    async fn get_all_notifications(&self) -> AppResult<Vec<Notification>>;

    /// Acknowledge a general notification as read.
    async fn read_notification(&self, id: NotificationId) -> AppResult<()>;

    /// Acknowledge a maintenance notification as read.
    async fn read_notification_maintenance(&self, id: NotificationId) -> AppResult<()>;
}

/// HTTP implementation over [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    client: ApiClient,
}

impl HttpNotificationApi {
    /// Create the collaborator.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn get_all_notifications(&self) -> AppResult<Vec<Notification>> {
        let list: ListResult<Notification> = self.client.get("/api/v1/notifications").await?;
        Ok(list.result)
    }

    async fn read_notification(&self, id: NotificationId) -> AppResult<()> {
        self.client
            .post_ack(&format!("/api/v1/notifications/{id}/read"))
            .await
    }

    async fn read_notification_maintenance(&self, id: NotificationId) -> AppResult<()> {
        self.client
            .post_ack(&format!("/api/v1/notifications/maintenance/{id}/read"))
            .await
    }
}
