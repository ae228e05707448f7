//! Notification domain entities.

pub mod category;
pub mod model;
pub mod payload;

pub use category::NotificationCategory;
pub use model::{Notification, NotificationStatus, Recipient};
pub use payload::NotificationPayload;
