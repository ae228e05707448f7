//! Shared type definitions.

pub mod id;
pub mod response;

pub use id::{MessageId, NotificationId, RoomId, UserId};
pub use response::{ApiEnvelope, ListResult, PageMeta};
