//! Valkey/Redis adapter for the log bus.

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::BusError;
use crate::traits::{BusEvent, BusSubscription, LogBus};

/// Redis-backed log bus.
///
/// Publishing shares one multiplexed connection; each pattern subscription
/// holds its own dedicated pub/sub connection, pumped by a single long-lived
/// task into the subscription's channel.
#[derive(Clone)]
pub struct RedisLogBus {
    client: redis::Client,
    publisher: MultiplexedConnection,
}

impl RedisLogBus {
    /// Connect to the bus at the given URL.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client =
            redis::Client::open(url).map_err(|e| BusError::Connection(e.to_string()))?;

        let mut publisher = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;

        // Test the connection
        redis::cmd("PING")
            .query_async::<String>(&mut publisher)
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;

        info!(url = %url, "connected to log bus");

        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl LogBus for RedisLogBus {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), BusError> {
        let mut conn = self.publisher.clone();

        // PUBLISH returns the subscriber count; nobody listening is fine.
        let receivers: i64 = conn
            .publish(channel, payload)
            .await
            .map_err(|e| BusError::Publish {
                channel: channel.to_owned(),
                message: e.to_string(),
            })?;

        debug!(channel = %channel, receivers, "published");
        Ok(())
    }

    async fn subscribe_pattern(&self, pattern: &str) -> Result<BusSubscription, BusError> {
        let mut pubsub =
            self.client
                .get_async_pubsub()
                .await
                .map_err(|e| BusError::Subscribe {
                    pattern: pattern.to_owned(),
                    message: e.to_string(),
                })?;

        pubsub
            .psubscribe(pattern)
            .await
            .map_err(|e| BusError::Subscribe {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            })?;

        info!(pattern = %pattern, "pattern subscription established");

        let (tx, rx) = mpsc::unbounded_channel();
        let pattern = pattern.to_owned();

        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let channel = msg.get_channel_name().to_owned();
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "dropping non-text bus payload");
                        continue;
                    }
                };

                if tx.send(BusEvent { channel, payload }).is_err() {
                    // Subscriber dropped the receiving side.
                    break;
                }
            }
            debug!(pattern = %pattern, "pattern subscription closed");
        });

        Ok(BusSubscription::new(rx))
    }
}

impl std::fmt::Debug for RedisLogBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLogBus").finish_non_exhaustive()
    }
}
