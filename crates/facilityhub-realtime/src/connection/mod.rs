//! Broker connection lifecycle.

pub mod manager;
pub mod subscription;
