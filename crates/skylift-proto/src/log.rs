//! The log message payload carried over the bus.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Severity of a log message in a project's build stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Ordinary build output (worker stdout).
    Info,
    /// Build problems (worker stderr, terminal failures).
    Error,
    /// A completed step (build finished, file uploaded).
    Success,
}

/// One log line as it crosses the bus.
///
/// The JSON field is named `log`, not `message`; consumers depend on that
/// spelling and the relay forwards the serialised payload without renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    /// The log text.
    pub log: String,
    /// RFC 3339 timestamp stamped at creation.
    pub timestamp: String,
    /// Severity level.
    pub level: LogLevel,
}

impl LogMessage {
    /// Create a message at the given level, stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, level: LogLevel) -> Self {
        Self {
            log: text.into(),
            timestamp: Utc::now().to_rfc3339(),
            level,
        }
    }

    /// An `info`-level message.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, LogLevel::Info)
    }

    /// An `error`-level message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, LogLevel::Error)
    }

    /// A `success`-level message.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, LogLevel::Success)
    }

    /// Serialise to the JSON payload published on the bus.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a bus payload back into a message.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
