// ============================
// crates/realtime-lib/src/ws_router.rs
// ============================
//! WebSocket router and per-connection loop.
//!
//! Authentication happens before the upgrade: a request without a valid
//! token is answered with a plain HTTP 401 and never becomes a WebSocket.
//! Once upgraded, each connection owns one outbound channel; a forwarder
//! task serialises events onto the socket while the main loop parses and
//! dispatches inbound frames.

use crate::auth;
use crate::error::AppError;
use crate::handlers::RequestContext;
use crate::metrics as keys;
use crate::registry::ConnectionHandle;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use hrms_common::{ClientEvent, Identity, ServerEvent};
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Capacity of each connection's outbound channel. Events beyond this
/// backlog are dropped, never queued unboundedly.
const OUTBOUND_CAPACITY: usize = 32;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Bearer token carried in the handshake query string.
    token: Option<String>,
}

/// Upgrade handler. Verifies the token and resolves a fresh identity
/// before agreeing to the upgrade; failures are HTTP 401, not a
/// post-upgrade close.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let Some(token) = auth::bearer_token(query.token.as_deref(), auth_header) else {
        counter!(keys::WS_AUTH_REJECTED).increment(1);
        return AppError::Authentication("MissingToken".to_string()).into_response();
    };

    let identity = match state.auth.authenticate(state.store.as_ref(), token).await {
        Ok(identity) => identity,
        Err(err) => {
            counter!(keys::WS_AUTH_REJECTED).increment(1);
            warn!(%err, "handshake rejected");
            return err.into_response();
        },
    };

    counter!(keys::WS_CONNECTION).increment(1);
    ws.on_upgrade(move |socket| handle_connection(socket, state, identity))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut outbound) = mpsc::channel::<ServerEvent>(OUTBOUND_CAPACITY);

    let handle = ConnectionHandle::new(identity.role, tx.clone());
    let connection_id = handle.connection_id;
    if let Some(evicted) = state.registry.register(&identity, handle) {
        debug!(
            user_id = identity.user_id,
            superseded = %evicted.connection_id,
            "new connection supersedes existing one"
        );
    }
    info!(
        user_id = identity.user_id,
        role = identity.role.as_str(),
        %connection_id,
        "user connected"
    );

    // Forwarder: the only task that writes to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    error!(%err, event = event.name(), "failed to serialise outbound event");
                    continue;
                },
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let ctx = RequestContext {
        identity: identity.clone(),
        reply: tx,
    };
    ctx.emit(ServerEvent::Connected {
        message: "Connected to real-time updates".to_string(),
        user_id: identity.user_id.clone(),
        role: identity.role,
        timestamp: Utc::now(),
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => event,
                    Err(err) => {
                        counter!(keys::EVENT_ERROR).increment(1);
                        debug!(user_id = ctx.identity.user_id, %err, "malformed frame");
                        ctx.emit(AppError::from(err).to_event());
                        continue;
                    },
                };

                // Exactly one error event per failed request; the
                // connection itself stays up.
                if let Err(err) = state.handlers.dispatch(&ctx, event).await {
                    counter!(keys::EVENT_ERROR).increment(1);
                    warn!(user_id = ctx.identity.user_id, %err, "request failed");
                    ctx.emit(err.to_event());
                }
            },
            Message::Close(_) => break,
            _ => {},
        }
    }

    // Stale-guarded: a superseded connection's exit leaves the newer
    // registration untouched.
    if state.registry.unregister(&identity.user_id, connection_id) {
        info!(user_id = identity.user_id, %connection_id, "user disconnected");
    }
    counter!(keys::WS_DISCONNECTION).increment(1);
    send_task.abort();
}
