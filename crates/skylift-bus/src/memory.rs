//! In-memory log bus for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::traits::{BusEvent, BusSubscription, LogBus};

struct PatternSubscriber {
    pattern: String,
    sender: mpsc::UnboundedSender<BusEvent>,
}

/// Process-local bus with the same observable semantics as the Redis
/// backend: fire-and-forget publish, per-publisher ordering, no replay for
/// late subscribers.
#[derive(Default)]
pub struct InMemoryLogBus {
    subscribers: Mutex<Vec<PatternSubscriber>>,
}

impl InMemoryLogBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Trailing-`*` glob match, the only pattern form the bus uses.
fn pattern_matches(pattern: &str, channel: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix),
        None => channel == pattern,
    }
}

#[async_trait]
impl LogBus for InMemoryLogBus {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), BusError> {
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|e| BusError::Publish {
                channel: channel.to_owned(),
                message: e.to_string(),
            })?;

        // Drop subscribers whose receiving side has gone away.
        subscribers.retain(|sub| {
            if !pattern_matches(&sub.pattern, channel) {
                return true;
            }
            sub.sender
                .send(BusEvent {
                    channel: channel.to_owned(),
                    payload: payload.to_owned(),
                })
                .is_ok()
        });

        Ok(())
    }

    async fn subscribe_pattern(&self, pattern: &str) -> Result<BusSubscription, BusError> {
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers
            .lock()
            .map_err(|e| BusError::Subscribe {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            })?
            .push(PatternSubscriber {
                pattern: pattern.to_owned(),
                sender: tx,
            });

        Ok(BusSubscription::new(rx))
    }
}

impl std::fmt::Debug for InMemoryLogBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLogBus").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pattern_subscriber_receives_matching_channels() {
        let bus = InMemoryLogBus::new();
        let mut sub = bus.subscribe_pattern("logs:*").await.unwrap();

        bus.publish("logs:brave-otter-42", "one").await.unwrap();
        bus.publish("metrics:cpu", "ignored").await.unwrap();
        bus.publish("logs:calm-heron-7", "two").await.unwrap();

        let first = sub.recv().await.unwrap();
        assert_eq!(first.channel, "logs:brave-otter-42");
        assert_eq!(first.payload, "one");

        let second = sub.recv().await.unwrap();
        assert_eq!(second.channel, "logs:calm-heron-7");
        assert_eq!(second.payload, "two");
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_messages() {
        let bus = InMemoryLogBus::new();

        bus.publish("logs:brave-otter-42", "before").await.unwrap();

        let mut sub = bus.subscribe_pattern("logs:*").await.unwrap();
        bus.publish("logs:brave-otter-42", "after").await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.payload, "after");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = InMemoryLogBus::new();
        bus.publish("logs:anyone", "payload").await.unwrap();
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned() {
        let bus = InMemoryLogBus::new();
        let sub = bus.subscribe_pattern("logs:*").await.unwrap();
        drop(sub);

        bus.publish("logs:brave-otter-42", "payload").await.unwrap();
        assert!(bus.subscribers.lock().unwrap().is_empty());
    }

    #[test]
    fn glob_matching() {
        assert!(pattern_matches("logs:*", "logs:brave-otter-42"));
        assert!(pattern_matches("logs:*", "logs:"));
        assert!(!pattern_matches("logs:*", "metrics:cpu"));
        assert!(pattern_matches("exact", "exact"));
        assert!(!pattern_matches("exact", "exact-not"));
    }
}
