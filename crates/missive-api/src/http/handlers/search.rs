//! Global content search handler.

use std::time::Instant;

use axum::extract::{Query, State};
use uuid::Uuid;

use missive_types::message::SearchResults;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::{SearchQuery, int_or};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/messages/search/all?query=... - Case-insensitive search across sessions.
pub async fn search_messages(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<SearchResults>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let default_limit = i64::from(state.message_service.paginator().default_limit());
    let limit = int_or(query.limit.as_deref(), default_limit);
    let offset = int_or(query.offset.as_deref(), 0);

    let results = state
        .message_service
        .search_messages_globally(query.query.as_deref().unwrap_or_default(), limit, offset)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(results, request_id, elapsed))
}
