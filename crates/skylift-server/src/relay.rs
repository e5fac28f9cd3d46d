//! Log relay.
//!
//! A pure forwarding loop: the single bus subscriber for `logs:*`, pushing
//! every payload to the multiplexer channel named after the producing
//! project. No buffering and no transformation: the payload crosses verbatim.

use std::sync::Arc;

use skylift_bus::BusSubscription;
use skylift_proto::channel::project_from_channel;
use tracing::{info, trace, warn};

use crate::realtime::ChannelMultiplexer;

/// Run the relay until the subscription closes (process lifetime in
/// practice). A single bad event is logged and skipped; the loop never stops
/// because of one delivery.
pub async fn run_relay(mut subscription: BusSubscription, multiplexer: Arc<ChannelMultiplexer>) {
    info!("log relay started");

    while let Some(event) = subscription.recv().await {
        let Some(project_id) = project_from_channel(&event.channel) else {
            warn!(channel = %event.channel, "ignoring message outside the log namespace");
            continue;
        };

        let delivered = multiplexer.broadcast(project_id, &event.payload);
        trace!(channel = %project_id, delivered, "forwarded log message");
    }

    info!("log relay stopped: subscription closed");
}
