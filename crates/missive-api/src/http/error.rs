//! Application error type mapping to HTTP status codes and envelope format.

use std::any::Any;

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use missive_types::error::MessageError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the message service.
    Message(MessageError),
    /// Missing or malformed credentials (401).
    Unauthorized(String),
    /// Credentials present but not accepted (403).
    Forbidden(String),
    /// Request rejected before reaching the service.
    BadRequest { code: &'static str, message: String },
    /// Request body exceeded the configured limit (413).
    PayloadTooLarge(String),
    /// Generic internal error. The detail is logged, never returned.
    Internal(String),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        AppError::Message(e)
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
            status if status.is_server_error() => AppError::Internal(rejection.body_text()),
            _ => AppError::bad_request("INVALID_BODY", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            AppError::Internal(rejection.body_text())
        } else {
            AppError::bad_request("INVALID_PATH", rejection.body_text())
        }
    }
}

/// Render a handler panic as a 500 envelope. Used by `CatchPanicLayer`.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic with non-string payload".to_string()
    };
    AppError::Internal(detail).into_response()
}

fn message_status(err: &MessageError) -> StatusCode {
    match err {
        MessageError::NotFound(_) => StatusCode::NOT_FOUND,
        MessageError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Message(MessageError::Database(detail)) => {
                tracing::error!(error = %detail, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::Message(e) => (message_status(e), e.code(), e.to_string(), e.details()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", msg.clone(), None)
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "INVALID_API_KEY", msg.clone(), None)
            }
            AppError::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, *code, message.clone(), None)
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone(), None)
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        ApiResponse::error(status, code, &message, details, Uuid::now_v7().to_string())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::from(MessageError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (
                AppError::from(MessageError::MissingFields(vec!["content".into()])),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(MessageError::Database("locked".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Unauthorized("no key".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("bad key".into()), StatusCode::FORBIDDEN),
            (AppError::bad_request("EMPTY_PAYLOAD", "empty"), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge("too big".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn panic_payload_becomes_internal_error() {
        let response = handle_panic(Box::new("handler exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(42_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
