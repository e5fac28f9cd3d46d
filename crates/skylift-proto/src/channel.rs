//! Bus channel naming.
//!
//! Workers publish on `logs:{project_id}`; clients subscribe to the bare
//! `{project_id}` on the multiplexer. The relay strips the prefix when it
//! forwards, so the two namespaces stay equal modulo `logs:`.

/// Prefix for per-project log channels on the bus.
pub const LOG_CHANNEL_PREFIX: &str = "logs:";

/// Pattern matching every project log channel.
pub const LOG_CHANNEL_PATTERN: &str = "logs:*";

/// The bus channel a worker publishes on for the given project.
#[must_use]
pub fn log_channel(project_id: &str) -> String {
    format!("{LOG_CHANNEL_PREFIX}{project_id}")
}

/// Extract the project id from a bus channel name.
///
/// Returns `None` for channels outside the log namespace.
#[must_use]
pub fn project_from_channel(channel: &str) -> Option<&str> {
    channel.strip_prefix(LOG_CHANNEL_PREFIX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_project_id() {
        let channel = log_channel("brave-otter-42");
        assert_eq!(channel, "logs:brave-otter-42");
        assert_eq!(project_from_channel(&channel), Some("brave-otter-42"));
    }

    #[test]
    fn rejects_foreign_channels() {
        assert_eq!(project_from_channel("placements:web"), None);
        assert_eq!(project_from_channel("brave-otter-42"), None);
    }

    #[test]
    fn pattern_covers_the_prefix() {
        assert!(LOG_CHANNEL_PATTERN.starts_with(LOG_CHANNEL_PREFIX));
    }
}
