use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, warn};

use crate::engine::dispatcher::DispatchError;
use crate::engine::interaction::{InboundEvent, Interaction, InteractionType, PayloadError};
use crate::engine::response::InteractionResponse;

use super::app_state::AppState;

/// POST /api/interact: signed webhook from the platform.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent; it is parsed only after that succeeds.
pub async fn interact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = InboundEvent::new(headers, body);

    if !state.verifier.verify(&event) {
        warn!("rejected interaction with invalid signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid request signature"})),
        )
            .into_response();
    }

    let payload = match event.payload() {
        Ok(payload) => payload,
        Err(e) => return bad_request(&e),
    };

    match payload.interaction_type() {
        Some(InteractionType::Ping) => {
            debug!("answering ping");
            return Json(json!({"type": 1})).into_response();
        }
        Some(InteractionType::ApplicationCommand) => {}
        _ => return bad_request(&PayloadError::UnsupportedType(payload.kind)),
    }

    let interaction = match Interaction::from_payload(payload) {
        Ok(interaction) => interaction,
        Err(e) => return bad_request(&e),
    };

    match state.dispatcher.dispatch(&interaction).await {
        Ok(result) => match InteractionResponse::from_result(result) {
            Some(response) => Json(response).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
        Err(e @ DispatchError::UnknownCommand(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response()
        }
    }
}

fn bad_request(e: &PayloadError) -> Response {
    warn!(error = %e, "rejected interaction payload");
    (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response()
}
