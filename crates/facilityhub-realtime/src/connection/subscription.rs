//! Subscription registry — routes inbound MESSAGE frames to subscribers.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// A live topic subscription. Message bodies arrive on `receiver` in the
/// order the broker delivered them on this topic.
#[derive(Debug)]
pub struct Subscription {
    /// STOMP subscription id (`sub-N`).
    pub id: String,
    /// The subscribed topic path.
    pub topic: String,
    /// Inbound message bodies.
    pub receiver: mpsc::Receiver<String>,
}

#[derive(Debug)]
pub(crate) struct SubscriptionEntry {
    pub topic: String,
    pub sender: mpsc::Sender<String>,
}

/// Registry of active subscriptions, keyed by STOMP subscription id.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    entries: DashMap<String, SubscriptionEntry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn add(&self, id: String, topic: String, sender: mpsc::Sender<String>) {
        self.entries.insert(id, SubscriptionEntry { topic, sender });
    }

    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Delivers a message body to a subscription. Subscriptions whose
    /// receiver was dropped are pruned on delivery failure.
    pub async fn deliver(&self, id: &str, body: String) {
        let sender = match self.entries.get(id) {
            Some(entry) => entry.sender.clone(),
            None => {
                debug!(subscription = %id, "Message for unknown subscription, dropped");
                return;
            }
        };

        if sender.send(body).await.is_err() {
            debug!(subscription = %id, "Subscriber gone, pruning subscription");
            self.entries.remove(id);
        }
    }

    /// Snapshot of `(id, topic)` pairs, for re-subscribing after reconnect.
    pub fn all(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().topic.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
