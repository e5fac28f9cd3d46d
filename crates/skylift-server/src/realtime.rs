//! Realtime channel multiplexer.
//!
//! Holds live client connections grouped by subscription channel and
//! broadcasts payloads to every member of a channel. Membership is keyed by
//! connection identity and guarded per channel, so joins and disconnects on
//! one channel never serialise broadcasts on another.
//!
//! Delivery is at-most-once per currently-subscribed connection: a channel
//! with no members is a no-op and no backlog is retained for late joiners.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Identity of one live client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Per-connection outbox. Unbounded so a broadcast never blocks on a slow
/// member; a disconnected client just stops draining and is pruned.
pub type Outbox = mpsc::UnboundedSender<String>;

/// Concurrent set-of-sets: channel name → member connections.
#[derive(Default)]
pub struct ChannelMultiplexer {
    channels: DashMap<String, DashMap<ConnectionId, Outbox>>,
    next_id: AtomicU64,
}

impl ChannelMultiplexer {
    /// Create an empty multiplexer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identity for a newly-accepted connection.
    pub fn connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add a connection to a channel's member set.
    ///
    /// Idempotent: joining a channel twice leaves a single membership, so a
    /// broadcast still delivers once.
    pub fn join(&self, id: ConnectionId, outbox: &Outbox, channel: &str) {
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .insert(id, outbox.clone());
        debug!(connection = %id, channel = %channel, "joined channel");
    }

    /// Deliver a payload to every current member of a channel.
    ///
    /// Returns the number of members reached. An unknown or empty channel is
    /// a no-op. Members whose outbox has closed are pruned on the way.
    pub fn broadcast(&self, channel: &str, payload: &str) -> usize {
        let Some(members) = self.channels.get(channel) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead = Vec::new();

        for member in members.iter() {
            if member.value().send(payload.to_owned()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*member.key());
            }
        }

        for id in &dead {
            members.remove(id);
            debug!(connection = %id, channel = %channel, "pruned closed connection");
        }
        drop(members);

        if !dead.is_empty() {
            self.channels.remove_if(channel, |_, m| m.is_empty());
        }

        trace!(channel = %channel, delivered, "broadcast");
        delivered
    }

    /// Remove a connection from every channel it joined.
    pub fn disconnect(&self, id: ConnectionId) {
        let mut emptied = Vec::new();
        for entry in self.channels.iter() {
            if entry.value().remove(&id).is_some() && entry.value().is_empty() {
                emptied.push(entry.key().clone());
            }
        }
        for channel in emptied {
            self.channels.remove_if(&channel, |_, m| m.is_empty());
        }
        debug!(connection = %id, "disconnected");
    }

    /// Current member count of a channel.
    #[must_use]
    pub fn member_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |m| m.len())
    }
}
