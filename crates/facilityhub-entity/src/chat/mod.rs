//! Chat domain entities.

pub mod event;
pub mod message;
pub mod room;

pub use event::ChatEvent;
pub use message::ChatMessage;
pub use room::{ChatRoom, RoomKind};
