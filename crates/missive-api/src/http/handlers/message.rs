//! Message handlers for the REST API.
//!
//! Creation is open; every read and delete requires an API key. A successful
//! create is broadcast to WebSocket subscribers after it is stored.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use missive_core::event::MessageNotifier;
use missive_types::message::{MessageView, SessionMessages};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::{SessionMessagesQuery, int_or};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Whether the request declares a JSON body (`application/json` or `application/*+json`).
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decode the create body into a JSON object, rejecting empty or non-object payloads.
fn parse_candidate(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if !is_json_content_type(headers) {
        return Err(AppError::bad_request(
            "INVALID_CONTENT_TYPE",
            "Content-Type must be application/json",
        ));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("EMPTY_PAYLOAD", "Request body is empty"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request("INVALID_JSON", format!("Malformed JSON: {e}")))?;

    match value {
        Value::Null => Err(AppError::bad_request("EMPTY_PAYLOAD", "Request body is empty")),
        Value::Object(map) if map.is_empty() => {
            Err(AppError::bad_request("EMPTY_PAYLOAD", "Request body is empty"))
        }
        Value::Object(map) => Ok(map),
        _ => Err(AppError::bad_request(
            "INVALID_JSON",
            "Request body must be a JSON object",
        )),
    }
}

/// Reject path ids that are blank after trimming. Non-blank ids are kept as sent.
pub(crate) fn require_id(raw: &str, code: &'static str, field: &str) -> Result<String, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::bad_request(code, format!("{field} must not be blank")));
    }
    Ok(raw.to_string())
}

/// POST /api/messages - Validate, store and broadcast a message.
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiResponse<MessageView>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let body = body?;
    let candidate = parse_candidate(&headers, &body)?;
    let view = state.message_service.process_message(&candidate).await?;

    state.event_bus.notify_created(&view);

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/message/{}", view.message_id);
    let session_link = format!("/api/messages/{}", view.session_id);
    Ok(ApiResponse::success(view, request_id, elapsed)
        .with_status(StatusCode::CREATED)
        .with_link("self", &self_link)
        .with_link("session", &session_link))
}

/// GET /api/messages/{session_id} - One page of a session's messages, oldest first.
pub async fn list_session_messages(
    State(state): State<AppState>,
    _auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
    Query(query): Query<SessionMessagesQuery>,
) -> Result<ApiResponse<SessionMessages>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Path(session_id) = path?;
    let session_id = require_id(&session_id, "INVALID_SESSION_ID", "session_id")?;
    let paginator = state.message_service.paginator();
    let limit = int_or(query.limit.as_deref(), i64::from(paginator.default_limit()));
    let offset = int_or(query.offset.as_deref(), 0);

    let page = state
        .message_service
        .get_messages_by_session(&session_id, limit, offset, query.sender.as_deref())
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let stats_link = format!("/api/sessions/{session_id}/stats");
    Ok(ApiResponse::success(page, request_id, elapsed).with_link("stats", &stats_link))
}

/// GET /api/message/{message_id} - A single message.
pub async fn get_message(
    State(state): State<AppState>,
    _auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<MessageView>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Path(message_id) = path?;
    let message_id = require_id(&message_id, "INVALID_MESSAGE_ID", "message_id")?;
    let view = state.message_service.get_message_by_id(&message_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let session_link = format!("/api/messages/{}", view.session_id);
    Ok(ApiResponse::success(view, request_id, elapsed).with_link("session", &session_link))
}

/// DELETE /api/message/{message_id} - Remove a message and broadcast the deletion.
pub async fn delete_message(
    State(state): State<AppState>,
    _auth: Authenticated,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Path(message_id) = path?;
    let message_id = require_id(&message_id, "INVALID_MESSAGE_ID", "message_id")?;
    state.message_service.delete_message(&message_id).await?;
    state.event_bus.notify_deleted(&message_id);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        json!({ "deleted": true, "message_id": message_id }),
        request_id,
        elapsed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    fn code_of(err: AppError) -> &'static str {
        match err {
            AppError::BadRequest { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn content_type_variants() {
        assert!(is_json_content_type(&json_headers("application/json")));
        assert!(is_json_content_type(&json_headers("application/json; charset=utf-8")));
        assert!(is_json_content_type(&json_headers("application/merge-patch+json")));
        assert!(!is_json_content_type(&json_headers("text/plain")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn parse_candidate_rejections() {
        let headers = json_headers("application/json");
        assert_eq!(
            code_of(parse_candidate(&json_headers("text/plain"), b"{}").unwrap_err()),
            "INVALID_CONTENT_TYPE"
        );
        assert_eq!(code_of(parse_candidate(&headers, b"").unwrap_err()), "EMPTY_PAYLOAD");
        assert_eq!(code_of(parse_candidate(&headers, b"null").unwrap_err()), "EMPTY_PAYLOAD");
        assert_eq!(code_of(parse_candidate(&headers, b"{}").unwrap_err()), "EMPTY_PAYLOAD");
        assert_eq!(code_of(parse_candidate(&headers, b"{oops").unwrap_err()), "INVALID_JSON");
        assert_eq!(code_of(parse_candidate(&headers, b"[1,2]").unwrap_err()), "INVALID_JSON");
    }

    #[test]
    fn parse_candidate_accepts_object() {
        let headers = json_headers("application/json");
        let map = parse_candidate(&headers, br#"{"session_id":"s1"}"#).unwrap();
        assert_eq!(map["session_id"], "s1");
    }

    #[test]
    fn require_id_rejects_blank() {
        assert_eq!(
            code_of(require_id("  ", "INVALID_SESSION_ID", "session_id").unwrap_err()),
            "INVALID_SESSION_ID"
        );
        assert_eq!(require_id(" s1 ", "INVALID_SESSION_ID", "session_id").unwrap(), " s1 ");
    }
}
