//! Skylift build worker.
//!
//! Runs once inside an ephemeral container whose working directory a prior
//! clone step has already populated. Single forward path, no loops:
//!
//! ```text
//! Start → Validate environment → Build → Upload → Done
//!                                  │        │
//!                                  └────────┴──▶ Failed
//! ```
//!
//! Every stdout/stderr line of the build and every upload outcome is
//! published on the project's log channel; the log stream is the only signal
//! back to whoever dispatched this worker. There are no retries and no
//! timeouts; the worker is disposable and recovery is launching a new one.

pub mod build;
pub mod deploy;
pub mod env;
pub mod error;
pub mod publisher;
pub mod upload;

pub use deploy::{Deployment, DeployPaths};
pub use env::WorkerEnv;
pub use error::WorkerError;
pub use publisher::LogPublisher;
