//! Log publication on the project's bus channel.

use std::sync::Arc;

use skylift_bus::{BusError, LogBus};
use skylift_proto::{log_channel, LogLevel, LogMessage};
use tracing::warn;

/// Publishes level-tagged log messages on `logs:{project_id}`.
///
/// Every publish is awaited, so once a call returns the message has been
/// flushed to the bus, so dropping the publisher (and its bus) afterwards can
/// never lose the final status message.
#[derive(Clone)]
pub struct LogPublisher {
    bus: Arc<dyn LogBus>,
    channel: String,
}

impl LogPublisher {
    /// Create a publisher for the given project.
    #[must_use]
    pub fn new(bus: Arc<dyn LogBus>, project_id: &str) -> Self {
        Self {
            bus,
            channel: log_channel(project_id),
        }
    }

    /// Publish at `info` level.
    pub async fn info(&self, text: impl Into<String>) -> Result<(), BusError> {
        self.publish(LogMessage::new(text, LogLevel::Info)).await
    }

    /// Publish at `error` level.
    pub async fn error(&self, text: impl Into<String>) -> Result<(), BusError> {
        self.publish(LogMessage::new(text, LogLevel::Error)).await
    }

    /// Publish at `success` level.
    pub async fn success(&self, text: impl Into<String>) -> Result<(), BusError> {
        self.publish(LogMessage::new(text, LogLevel::Success)).await
    }

    async fn publish(&self, message: LogMessage) -> Result<(), BusError> {
        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                // A lost log line must not fail the build.
                warn!(error = %e, "failed to serialise log message");
                return Ok(());
            }
        };
        self.bus.publish(&self.channel, &payload).await
    }
}
