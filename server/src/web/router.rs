use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::app_state::AppState;
use super::{commands_api, interact};

/// Build the axum router: the interaction webhook, health, and (optionally)
/// the operator routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(commands_api::health))
        .route(
            "/api/interact",
            post(interact::interact)
                .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes)),
        );

    if state.config.admin.enable_routes {
        warn!("Operator routes are enabled and unauthenticated; do not expose publicly");
        let admin_routes = Router::new()
            .route("/api/commands/list", get(commands_api::list_commands))
            .route("/api/commands/sync", post(commands_api::sync_commands))
            .route(
                "/api/commands/register/{name}",
                post(commands_api::register_command),
            )
            .route(
                "/api/commands/delete/{id}",
                delete(commands_api::delete_command),
            )
            .route("/api/guilds/list", get(commands_api::list_guilds));
        router = router.merge(admin_routes);
    }

    router
        .layer(TraceLayer::new_for_http())
        // Anything that escapes a handler becomes a 500 instead of a dropped connection
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
