use serde_json::json;
use thiserror::Error;

/// Errors raised by the message pipeline and read-side queries.
///
/// Every variant carries a stable machine-readable code (see
/// [`MessageError::code`]) and optional structured details. Mapping to a
/// transport status is left to the caller.
#[derive(Debug, Error)]
pub enum MessageError {
    /// One or more required fields are absent, null, or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{0}")]
    Validation(String),

    #[error("search query must be at least {min} characters")]
    SearchQueryTooShort { min: usize },

    /// A field is present but malformed.
    #[error("{message}")]
    InvalidFormat {
        field: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The content matched one or more forbidden words.
    #[error("message contains inappropriate content")]
    InappropriateContent(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

impl MessageError {
    /// Shorthand for an `InvalidFormat` error without details.
    pub fn invalid_format(field: &str, message: impl Into<String>) -> Self {
        MessageError::InvalidFormat {
            field: field.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Stable error code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            MessageError::MissingFields(_) | MessageError::Validation(_) => "VALIDATION_ERROR",
            MessageError::SearchQueryTooShort { .. } => "SEARCH_QUERY_TOO_SHORT",
            MessageError::InvalidFormat { .. } => "INVALID_FORMAT",
            MessageError::InappropriateContent(_) => "INAPPROPRIATE_CONTENT",
            MessageError::NotFound(_) => "NOT_FOUND",
            MessageError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Structured details for the error body, when the variant has any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            MessageError::MissingFields(fields) => Some(json!({ "missing_fields": fields })),
            MessageError::InvalidFormat { details, .. } => details.clone(),
            MessageError::InappropriateContent(words) => {
                Some(json!({ "inappropriate_words_found": words }))
            }
            _ => None,
        }
    }
}

/// Errors from repository operations (used by trait definitions in missive-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_display_and_details() {
        let err = MessageError::MissingFields(vec!["content".to_string(), "sender".to_string()]);
        assert_eq!(err.to_string(), "missing required fields: content, sender");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        let details = err.details().unwrap();
        assert_eq!(details["missing_fields"][1], "sender");
    }

    #[test]
    fn test_inappropriate_content_details() {
        let err = MessageError::InappropriateContent(vec!["spam".to_string()]);
        assert_eq!(err.code(), "INAPPROPRIATE_CONTENT");
        assert_eq!(
            err.details().unwrap(),
            json!({ "inappropriate_words_found": ["spam"] })
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            MessageError::SearchQueryTooShort { min: 3 }.code(),
            "SEARCH_QUERY_TOO_SHORT"
        );
        assert_eq!(MessageError::invalid_format("sender", "bad").code(), "INVALID_FORMAT");
        assert_eq!(MessageError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(MessageError::Database("x".into()).code(), "DATABASE_ERROR");
        assert!(MessageError::Validation("dup".into()).details().is_none());
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
