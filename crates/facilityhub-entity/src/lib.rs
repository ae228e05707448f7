//! # facilityhub-entity
//!
//! Domain entities for FacilityHub Console: the authenticated session,
//! notifications (model, payload union, categories), chat rooms and
//! messages, and presence state.

pub mod chat;
pub mod notification;
pub mod presence;
pub mod session;

pub use chat::{ChatEvent, ChatMessage, ChatRoom, RoomKind};
pub use notification::{Notification, NotificationCategory, NotificationPayload, NotificationStatus};
pub use presence::{PresenceStatus, PresenceUpdate};
pub use session::{Role, Session};
