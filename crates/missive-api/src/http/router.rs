//! Axum router configuration with middleware.
//!
//! Message routes live under `/api/`; the WebSocket stream is `/ws/events`.
//! Middleware: body limit, panic recovery, CORS, tracing.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::handle_panic;
use crate::http::handlers;
use crate::state::AppState;

/// Largest accepted request body. Message content is capped well below this.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/messages", post(handlers::message::create_message))
        .route(
            "/messages/search/all",
            get(handlers::search::search_messages),
        )
        .route(
            "/messages/{session_id}",
            get(handlers::message::list_session_messages),
        )
        .route(
            "/message/{message_id}",
            get(handlers::message::get_message).delete(handlers::message::delete_message),
        )
        .route("/sessions", get(handlers::session::list_sessions))
        .route(
            "/sessions/{session_id}/stats",
            get(handlers::session::get_session_stats),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/ws/events", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .route("/", get(index))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET / - Service name, version and endpoint index.
async fn index() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "service": "missive",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "create_message": "POST /api/messages",
            "session_messages": "GET /api/messages/{session_id}",
            "get_message": "GET /api/message/{message_id}",
            "delete_message": "DELETE /api/message/{message_id}",
            "sessions": "GET /api/sessions",
            "session_stats": "GET /api/sessions/{session_id}/stats",
            "search": "GET /api/messages/search/all?query=...",
            "events": "GET /ws/events",
            "health": "GET /health",
        },
    }))
}
