//! Skylift control plane.
//!
//! One process hosts the three coordinating pieces of the pipeline:
//!
//! ```text
//! ┌──────────────┐   POST /projects   ┌──────────────┐
//! │  HTTP API    │───────────────────▶│  Dispatcher  │──▶ container runtime
//! └──────┬───────┘                    └──────────────┘
//!        │ GET /ws                           │ env: GIT_REPOSITORY_URL,
//!        ▼                                   ▼      PROJECT_ID
//! ┌──────────────┐    broadcast      ┌──────────────┐
//! │ Multiplexer  │◀──────────────────│  Log Relay   │◀── bus (logs:*)
//! └──────────────┘                   └──────────────┘
//! ```
//!
//! The dispatcher and the workers it launches never speak after launch; the
//! bus is the only observability path, and the relay is its single
//! subscriber.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod realtime;
pub mod relay;
pub mod slug;

pub use config::{ApiConfig, BusConfig, DeployConfig, LaunchConfig, ServerConfig};
pub use dispatch::{ContainerLauncher, Dispatcher, LaunchFacility, LaunchParams};
pub use error::{DispatchError, ServerError};
pub use realtime::{ChannelMultiplexer, ConnectionId};
