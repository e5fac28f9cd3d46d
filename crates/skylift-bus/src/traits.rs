//! The log bus trait and subscription stream.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BusError;

/// One message received through a pattern subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    /// Channel the message was published on.
    pub channel: String,
    /// The payload, exactly as published.
    pub payload: String,
}

/// A live pattern subscription.
///
/// Messages arrive in per-publisher order; there is no cross-publisher
/// ordering guarantee. Dropping the subscription releases the underlying
/// connection.
#[derive(Debug)]
pub struct BusSubscription {
    receiver: mpsc::UnboundedReceiver<BusEvent>,
}

impl BusSubscription {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<BusEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` once the backend side has closed.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.receiver.recv().await
    }
}

/// Backend-agnostic publish/subscribe bus keyed by channel name.
#[async_trait]
pub trait LogBus: Send + Sync {
    /// Publish a payload on a channel. Fire-and-forget: a successful return
    /// means the backend accepted the message, not that anyone received it.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), BusError>;

    /// Subscribe to every channel matching `pattern` (trailing-`*` glob).
    async fn subscribe_pattern(&self, pattern: &str) -> Result<BusSubscription, BusError>;
}
