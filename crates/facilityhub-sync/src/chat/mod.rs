//! Chat room and message synchronization.

pub mod synchronizer;

pub use synchronizer::ChatSynchronizer;
