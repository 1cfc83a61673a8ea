//! Operator endpoints for inspecting and reconciling registered commands.
//! Mounted only when `admin.enable_routes` is set.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use super::app_state::AppState;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({"status": "ok", "commands": state.registry.len()}))
}

/// GET /api/commands/list: local commands merged with their platform registration.
pub async fn list_commands(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.sync.list().await {
        Some(listing) => Json(listing).into_response(),
        None => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "Could not fetch registered commands"})),
        )
            .into_response(),
    }
}

/// POST /api/commands/sync: push every local command to the platform.
pub async fn sync_commands(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.sync.register_all().await;
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(report))
}

/// POST /api/commands/register/{name}: push a single local command.
pub async fn register_command(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    if !state.registry.contains(&name) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown command: {name}")})),
        )
            .into_response();
    }
    match state.sync.register(&name).await {
        Some(record) => (StatusCode::CREATED, Json(record)).into_response(),
        None => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "Command registration failed"})),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub guild_id: Option<String>,
}

/// DELETE /api/commands/delete/{id}?guild_id=
pub async fn delete_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> impl IntoResponse {
    if state.sync.unregister(&id, params.guild_id.as_deref()).await {
        Json(json!({"unregistered": true})).into_response()
    } else {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// GET /api/guilds/list
pub async fn list_guilds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.guilds.list_guilds().await {
        Some(guilds) => Json(guilds).into_response(),
        None => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "Could not fetch guilds"})),
        )
            .into_response(),
    }
}
