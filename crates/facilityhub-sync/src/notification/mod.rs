//! Notification aggregation and display formatting.

pub mod aggregator;
pub mod formatter;

pub use aggregator::NotificationAggregator;
