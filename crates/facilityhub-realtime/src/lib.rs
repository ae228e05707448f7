//! # facilityhub-realtime
//!
//! Realtime connection manager for FacilityHub Console. Provides:
//!
//! - A STOMP-over-WebSocket client with an in-crate frame codec
//! - One broker connection per signed-in session, with explicit open/close
//! - Topic subscriptions delivering message bodies in broker order
//! - Best-effort presence announcements (online/offline)
//! - Optional bounded exponential backoff reconnection
//!
//! Broker unreachability is never fatal: callers receive a connection error
//! and degrade to REST-only operation.

pub mod connection;
pub mod presence;
pub mod stomp;
pub mod topic;

pub use connection::manager::{ConnectionManager, ConnectionStatus, RealtimeConnection};
pub use connection::subscription::Subscription;
pub use presence::PresenceMap;
pub use topic::UserFeature;
