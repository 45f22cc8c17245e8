//! Query parameter extractors for list endpoints.
//!
//! Values are captured as raw strings so that absent or non-numeric input
//! falls back to defaults instead of rejecting the request.

use serde::Deserialize;

/// Query parameters for a session's message listing.
#[derive(Debug, Deserialize, Default)]
pub struct SessionMessagesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// `user`, `system`, or empty for no filter.
    pub sender: Option<String>,
}

/// Query parameters for global search.
#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Query parameters for the session index.
#[derive(Debug, Deserialize, Default)]
pub struct SessionListQuery {
    pub limit: Option<String>,
}

/// Parse an integer query value, using `default` when absent or non-numeric.
pub fn int_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}
