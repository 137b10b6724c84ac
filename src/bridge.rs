//! WebSocket bridge — the message-passing surface the app shell talks to.
//!
//! Each text frame carries one JSON request; the handler dispatches it to
//! the gateway and writes back exactly one JSON response, correlated by the
//! caller-supplied `id`. Malformed frames get a `bad_request` error instead
//! of closing the socket.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PersistError;
use crate::gateway::PersistenceGateway;

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Request from the app shell → bridge.
#[derive(Debug, Deserialize)]
#[serde(tag = "op")]
pub enum BridgeRequest {
    #[serde(rename = "save")]
    Save {
        id: Uuid,
        key: String,
        value: String,
        is_secure: bool,
        is_backup: bool,
    },
    #[serde(rename = "load")]
    Load {
        id: Uuid,
        key: String,
        is_secure: bool,
        is_backup: bool,
    },
    #[serde(rename = "delete")]
    Delete {
        id: Uuid,
        key: String,
        is_secure: bool,
        is_backup: bool,
    },
}

/// Response from the bridge → app shell.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BridgeResponse {
    /// Save or delete completed.
    #[serde(rename = "ok")]
    Ok { id: Uuid },
    /// Load completed with a stored value.
    #[serde(rename = "value")]
    Value { id: Uuid, value: String },
    #[serde(rename = "error")]
    Error {
        id: Uuid,
        code: ErrorCode,
        message: String,
    },
}

/// Wire-level error discriminant.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Load found no value for the key.
    EmptyResult,
    /// Opaque fault from the resolved backend, propagated unchanged.
    BackendFault,
    /// The frame was not a valid request.
    BadRequest,
}

fn failure(id: Uuid, err: PersistError) -> BridgeResponse {
    let code = match err {
        PersistError::EmptyResult => ErrorCode::EmptyResult,
        PersistError::Backend(_) => ErrorCode::BackendFault,
    };
    BridgeResponse::Error {
        id,
        code,
        message: err.to_string(),
    }
}

/// Dispatch one decoded request to the gateway.
///
/// Pure request → response mapping; the socket plumbing lives elsewhere so
/// this can be tested without a connection.
pub async fn handle_request(
    gateway: &PersistenceGateway,
    request: BridgeRequest,
) -> BridgeResponse {
    match request {
        BridgeRequest::Save {
            id,
            key,
            value,
            is_secure,
            is_backup,
        } => match gateway.save(&key, &value, is_secure, is_backup).await {
            Ok(()) => BridgeResponse::Ok { id },
            Err(e) => failure(id, e),
        },
        BridgeRequest::Load {
            id,
            key,
            is_secure,
            is_backup,
        } => match gateway.load(&key, is_secure, is_backup).await {
            Ok(value) => BridgeResponse::Value { id, value },
            Err(e) => failure(id, e),
        },
        BridgeRequest::Delete {
            id,
            key,
            is_secure,
            is_backup,
        } => match gateway.delete(&key, is_secure, is_backup).await {
            Ok(()) => BridgeResponse::Ok { id },
            Err(e) => failure(id, e),
        },
    }
}

// ── Router / WebSocket plumbing ─────────────────────────────────────────

#[derive(Clone)]
struct BridgeState {
    gateway: Arc<PersistenceGateway>,
}

/// Build the bridge router with the `/ws/persistence` endpoint.
///
/// Call this once and serve it (or merge it into a larger app router).
pub fn bridge_routes(gateway: Arc<PersistenceGateway>) -> Router {
    Router::new()
        .route("/ws/persistence", get(ws_persistence_handler))
        .with_state(BridgeState { gateway })
}

async fn ws_persistence_handler(
    ws: WebSocketUpgrade,
    State(state): State<BridgeState>,
) -> impl IntoResponse {
    info!("Persistence client connecting");
    ws.on_upgrade(|socket| handle_persistence_socket(socket, state.gateway))
}

async fn handle_persistence_socket(mut socket: WebSocket, gateway: Arc<PersistenceGateway>) {
    info!("Persistence client connected");

    while let Some(result) = socket.recv().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<BridgeRequest>(&text) {
                    Ok(request) => handle_request(&gateway, request).await,
                    Err(e) => {
                        debug!(error = %e, "Invalid JSON from persistence client");
                        BridgeResponse::Error {
                            id: Uuid::nil(),
                            code: ErrorCode::BadRequest,
                            message: e.to_string(),
                        }
                    }
                };
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("Persistence client disconnected during send");
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to encode bridge response"),
                }
            }
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("Persistence client disconnected");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Persistence WebSocket error");
                break;
            }
        }
    }

    info!("Persistence connection closed");
}
