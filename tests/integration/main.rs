//! Integration tests for the realtime connection and the session feed.

mod helpers;

mod connection_test;
mod feed_test;
