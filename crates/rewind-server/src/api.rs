//! HTTP API for the replay server.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use rewind_engine::ConnectionInfo;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::node::ServerState;
use crate::storage::SessionSummary;
use crate::ws::ws_replay_handler;

type AppState = Arc<ServerState>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        // Archived sessions available for replay
        .route("/api/v1/sessions", get(list_sessions))
        // Replays currently being streamed
        .route("/api/v1/replays", get(list_replays))
        // WebSocket replay stream
        .route("/ws/replay/{session_id}", get(ws_replay_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

// --- Health ---

async fn health() -> &'static str {
    "OK"
}

// --- Sessions ---

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, StatusCode> {
    let storage = Arc::clone(&state.storage);
    let sessions = tokio::task::spawn_blocking(move || storage.list_sessions())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            error!("Failed to list sessions: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(sessions))
}

// --- Replays ---

async fn list_replays(State(state): State<AppState>) -> Json<Vec<ConnectionInfo>> {
    Json(state.scheduler.registry().list())
}
