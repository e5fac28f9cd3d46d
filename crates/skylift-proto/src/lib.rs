//! Wire types shared between the Skylift control plane and build workers.
//!
//! This crate defines the shapes that cross process boundaries:
//!
//! - [`LogMessage`]: the JSON payload workers publish on the log bus and the
//!   relay forwards to subscribed clients, verbatim.
//! - Channel naming: workers publish on `logs:{project_id}`; clients
//!   subscribe to `{project_id}`. The relay strips the prefix on forward and
//!   this mapping must be preserved exactly for client compatibility.
//! - [`ClientFrame`] / [`ServerFrame`]: the WebSocket subscription protocol
//!   between clients and the control plane.

pub mod channel;
mod log;
mod subscribe;

pub use channel::{log_channel, project_from_channel, LOG_CHANNEL_PATTERN, LOG_CHANNEL_PREFIX};
pub use log::{LogLevel, LogMessage};
pub use subscribe::{ClientFrame, ServerFrame};
