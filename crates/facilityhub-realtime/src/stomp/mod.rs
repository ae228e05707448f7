//! Minimal STOMP 1.2 client framing.

pub mod frame;

pub use frame::{Command, Frame};
