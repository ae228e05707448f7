//! # facilityhub-sync
//!
//! Keeps locally held notification and chat state consistent with the
//! backend. Two components share one strategy: push events append into
//! local buffers for immediate display, and every push also triggers a
//! full snapshot refetch that replaces the held state ("invalidate
//! broadly, refetch"). Refreshes are idempotent full replacements, safe to
//! run overlapping.

pub mod chat;
pub mod feed;
pub mod notification;

pub use chat::synchronizer::ChatSynchronizer;
pub use feed::SessionFeed;
pub use notification::aggregator::NotificationAggregator;
