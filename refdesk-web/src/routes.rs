//! Route definitions for the Refdesk web server

use crate::{handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route(
            "/sessions",
            post(handlers::create_session).get(handlers::list_sessions),
        )
        .route("/sessions/{session_id}", delete(handlers::remove_session))
        // Mode selector
        .route("/mode", post(handlers::select_mode))
        // Turn dispatch
        .route("/chat", post(handlers::chat_turn))
        // Page render
        .route("/page/{session_id}", get(handlers::get_page));

    #[cfg(feature = "openapi")]
    let router = router.route("/openapi.json", get(crate::openapi::openapi_spec));

    router
}

/// Create the chat page route
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::chat_page))
}
