//! WebSocket subscription protocol between clients and the control plane.
//!
//! A client sends [`ClientFrame::Subscribe`] naming a channel; the server
//! acknowledges with [`ServerFrame::Subscribed`]. From then on every broadcast
//! on that channel is pushed to the client as a raw text frame carrying the
//! forwarded bus payload verbatim; log events are not re-wrapped in a typed
//! frame.

use serde::{Deserialize, Serialize};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join a project's log channel.
    Subscribe {
        /// Channel name (= project id).
        channel: String,
    },
}

/// Frames the server sends, other than verbatim log payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Acknowledges a subscription.
    Subscribed {
        /// Channel the connection joined.
        channel: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_frame_shape() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"subscribe","channel":"brave-otter-42"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Subscribe {
                channel: "brave-otter-42".to_owned()
            }
        );
    }

    #[test]
    fn ack_frame_shape() {
        let json = serde_json::to_string(&ServerFrame::Subscribed {
            channel: "brave-otter-42".to_owned(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"subscribed","channel":"brave-otter-42"}"#);
    }

    #[test]
    fn unknown_frame_types_are_rejected() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"publish","channel":"x"}"#).is_err());
    }
}
