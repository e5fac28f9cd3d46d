//! Error types for the control plane.

use thiserror::Error;

/// Errors from dispatching a build worker.
///
/// These are the only failures surfaced synchronously to the originating
/// caller; everything downstream of a successful launch is reported through
/// the log stream instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The launch facility ran but rejected the request.
    #[error("launch facility rejected the request: {message}")]
    LaunchRejected {
        /// Facility output (capacity, bad parameters, auth failure, ...).
        message: String,
    },

    /// The launch facility itself could not be invoked.
    #[error("failed to invoke launch facility: {0}")]
    Runtime(String),
}

/// Errors raised while bringing the control plane up.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to parse configuration.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Failed to connect to the log bus.
    #[error("bus error: {0}")]
    Bus(#[from] skylift_bus::BusError),

    /// Failed to bind or serve the HTTP listener.
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ServerError {
    fn from(e: figment::Error) -> Self {
        Self::ConfigParse(e.to_string())
    }
}
