//! Error types for bus operations.

use thiserror::Error;

/// Errors that can occur talking to the log bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// Failed to establish a connection to the bus.
    #[error("failed to connect to bus: {0}")]
    Connection(String),

    /// A publish was rejected by the backend.
    #[error("failed to publish on channel '{channel}': {message}")]
    Publish {
        /// Channel the publish was addressed to.
        channel: String,
        /// Backend error message.
        message: String,
    },

    /// A pattern subscription could not be established.
    #[error("failed to subscribe to pattern '{pattern}': {message}")]
    Subscribe {
        /// The requested pattern.
        pattern: String,
        /// Backend error message.
        message: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn publish_error_names_the_channel() {
        let err = BusError::Publish {
            channel: "logs:brave-otter-42".to_owned(),
            message: "connection reset".to_owned(),
        };
        assert!(err.to_string().contains("logs:brave-otter-42"));
        assert!(err.to_string().contains("connection reset"));
    }
}
