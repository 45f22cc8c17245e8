//! Session-level handlers: the session index and per-session statistics.

use std::time::Instant;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};
use uuid::Uuid;

use missive_types::message::SessionStatistics;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::{SessionListQuery, int_or};
use crate::http::handlers::message::require_id;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/sessions - Distinct session ids, most recently active first.
pub async fn list_sessions(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<SessionListQuery>,
) -> Result<ApiResponse<Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let default_limit = i64::from(state.message_service.paginator().default_limit());
    let limit = int_or(query.limit.as_deref(), default_limit);
    let sessions = state.message_service.list_session_ids(limit).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(json!({ "sessions": sessions }), request_id, elapsed))
}

/// GET /api/sessions/{session_id}/stats - Message counts for one session.
pub async fn get_session_stats(
    State(state): State<AppState>,
    _auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<SessionStatistics>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Path(session_id) = path?;
    let session_id = require_id(&session_id, "INVALID_SESSION_ID", "session_id")?;
    let stats = state
        .message_service
        .get_session_statistics(&session_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let messages_link = format!("/api/messages/{session_id}");
    Ok(ApiResponse::success(stats, request_id, elapsed).with_link("messages", &messages_link))
}
