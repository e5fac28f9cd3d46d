//! HTTP API and WebSocket endpoint.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use skylift_proto::{ClientFrame, ServerFrame};

use crate::config::DeployConfig;
use crate::dispatch::Dispatcher;
use crate::realtime::ChannelMultiplexer;
use crate::slug;

/// Shared application state, constructed once in `main`.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub multiplexer: Arc<ChannelMultiplexer>,
    pub deploy: DeployConfig,
}

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/projects", post(create_project))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}

/// Request body for a new deployment.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Repository to build.
    pub git_url: String,
    /// Optional caller-supplied slug; generated when absent.
    pub slug: Option<String>,
}

/// Response for a queued deployment.
#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub status: &'static str,
    pub data: ProjectData,
}

#[derive(Debug, Serialize)]
pub struct ProjectData {
    pub project_slug: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Queue a build-and-deploy for a repository.
///
/// A launch rejection is the one error class surfaced synchronously; every
/// later failure reaches the caller only through the project's log stream.
async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, (StatusCode, Json<ErrorResponse>)> {
    let project_slug = request.slug.unwrap_or_else(slug::generate);

    state
        .dispatcher
        .dispatch(&request.git_url, &project_slug)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    let url = format!("http://{}.{}", project_slug, state.deploy.preview_host);
    Ok(Json(CreateProjectResponse {
        status: "queued",
        data: ProjectData { project_slug, url },
    }))
}

/// WebSocket endpoint for live log streams.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop: subscribe directives in, acks and verbatim log
/// payloads out. Membership dies with the connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = state.multiplexer.connection_id();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<String>();

    debug!(connection = %conn_id, "websocket connected");

    loop {
        tokio::select! {
            // Broadcast payloads queued for this connection.
            payload = inbox.recv() => {
                match payload {
                    Some(payload) => {
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Directives from the client.
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Subscribe { channel }) => {
                                // Any connection may join any channel.
                                state.multiplexer.join(conn_id, &outbox, &channel);
                                info!(connection = %conn_id, channel = %channel, "client subscribed");

                                let ack = ServerFrame::Subscribed { channel };
                                match serde_json::to_string(&ack) {
                                    Ok(json) => {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => warn!(error = %e, "failed to serialise ack"),
                                }
                            }
                            Err(e) => {
                                debug!(connection = %conn_id, error = %e, "ignoring malformed frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.multiplexer.disconnect(conn_id);
    debug!(connection = %conn_id, "websocket disconnected");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_with_and_without_slug() {
        let with: CreateProjectRequest = serde_json::from_str(
            r#"{"git_url":"https://example.com/repo.git","slug":"brave-otter-42"}"#,
        )
        .unwrap();
        assert_eq!(with.slug.as_deref(), Some("brave-otter-42"));

        let without: CreateProjectRequest =
            serde_json::from_str(r#"{"git_url":"https://example.com/repo.git"}"#).unwrap();
        assert!(without.slug.is_none());
    }

    #[test]
    fn queued_response_shape() {
        let response = CreateProjectResponse {
            status: "queued",
            data: ProjectData {
                project_slug: "brave-otter-42".to_owned(),
                url: "http://brave-otter-42.localhost:8000".to_owned(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"queued\""));
        assert!(json.contains("\"project_slug\":\"brave-otter-42\""));
        assert!(json.contains("http://brave-otter-42.localhost:8000"));
    }
}
