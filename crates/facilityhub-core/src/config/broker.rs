//! Message broker (STOMP over WebSocket) configuration.

use serde::{Deserialize, Serialize};

/// Broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// WebSocket endpoint, e.g. `ws://localhost:8080/ws`.
    pub endpoint: String,
    /// Handshake timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Buffer size for per-subscription delivery channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Reconnection policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Bounded exponential backoff reconnection policy.
///
/// The original console never reconnected after a drop. The policy is kept
/// configurable so that behavior remains available (`enabled = false`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Whether to reconnect after an unexpected connection loss.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum reconnection attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Backoff delay ceiling in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl ReconnectConfig {
    /// Backoff delay in milliseconds before the given attempt (1-based),
    /// doubling from `base_delay_ms` and capped at `max_delay_ms`.
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_channel_buffer() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    8
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}
