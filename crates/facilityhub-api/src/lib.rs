//! # facilityhub-api
//!
//! REST collaborator clients. Every endpoint answers the standard
//! `{statusCode, data, message, error}` envelope; the clients decode it and
//! surface backend errors verbatim. No endpoint is ever retried
//! automatically.
//!
//! The collaborators are exposed as traits so the sync layer can be tested
//! against in-memory fakes.

pub mod chat;
pub mod client;
pub mod notification;

pub use chat::{ChatApi, HttpChatApi, RoomLists};
pub use client::ApiClient;
pub use notification::{HttpNotificationApi, NotificationApi};
