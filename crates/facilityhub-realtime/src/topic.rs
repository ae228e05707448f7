//! Broker topic path construction.
//!
//! Topic names are string paths fixed by the backend. The session-scoped
//! set is the global presence topic plus six user-scoped feature topics.

use facilityhub_core::types::{RoomId, UserId};

/// Destination for outbound presence announcements.
pub const USER_STATUS_DESTINATION: &str = "/app/user-status";

/// The six user-scoped feature topics subscribed for every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserFeature {
    /// Payment events.
    PaymentNotifications,
    /// Meter-verification events.
    ElectricityUsageVerification,
    /// Maintenance schedule events.
    Maintenance,
    /// Admin work-registration events.
    AdminWorkRegistrations,
    /// Direct messages.
    Messages,
    /// Admin notifications.
    AdminNotifications,
}

impl UserFeature {
    /// All six features, in subscription order.
    pub const ALL: [UserFeature; 6] = [
        Self::PaymentNotifications,
        Self::ElectricityUsageVerification,
        Self::Maintenance,
        Self::AdminWorkRegistrations,
        Self::Messages,
        Self::AdminNotifications,
    ];

    fn path_segment(&self) -> &'static str {
        match self {
            Self::PaymentNotifications => "paymentNotifications",
            Self::ElectricityUsageVerification => "electricityUsageVerification",
            Self::Maintenance => "maintenance",
            Self::AdminWorkRegistrations => "admin/work-registrations",
            Self::Messages => "messages",
            Self::AdminNotifications => "adminNotifications",
        }
    }
}

/// The global presence topic.
pub fn user_status() -> String {
    "/topic/user-status".to_string()
}

/// A user-scoped feature topic.
pub fn for_user(feature: UserFeature, user_id: UserId) -> String {
    format!("/topic/{}/{}", feature.path_segment(), user_id)
}

/// The topic of a single chat room.
pub fn room(room_id: RoomId) -> String {
    format!("/topic/messages/room/{room_id}")
}
