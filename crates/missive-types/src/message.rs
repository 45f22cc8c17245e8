//! Chat message domain types for Missive.
//!
//! A `MessageRecord` is the stored form of a message; `MessageView` is the
//! shape handed back to callers. The listing, search and statistics payloads
//! produced by the message service also live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Maximum length (in characters) of `message_id` and `session_id`.
pub const MAX_ID_LENGTH: usize = 255;

/// Maximum length (in characters) of message content.
pub const MAX_CONTENT_LENGTH: usize = 5000;

/// Role tag on a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender IN ('user', 'system'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

impl Sender {
    /// Every accepted sender value, in the order reported to callers.
    pub const VALID: [&'static str; 2] = ["user", "system"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::System => "system",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = String;

    /// Exact, case-sensitive match: `"User"` is not a valid sender.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "system" => Ok(Sender::System),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// Derived metadata computed once from the content at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Number of whitespace-delimited tokens.
    pub word_count: u32,
    /// Number of characters (Unicode scalar values, not bytes).
    pub character_count: u32,
}

impl MessageMetadata {
    pub fn from_content(content: &str) -> Self {
        Self {
            word_count: content.split_whitespace().count() as u32,
            character_count: content.chars().count() as u32,
        }
    }
}

/// A stored chat message.
///
/// Immutable after creation. `word_count` and `character_count` are never
/// recomputed once the record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Globally unique identifier (caller-supplied or generated).
    pub message_id: String,
    /// Conversation grouping key.
    pub session_id: String,
    pub content: String,
    pub sender: Sender,
    /// When the message was sent (UTC).
    pub timestamp: DateTime<Utc>,
    pub word_count: u32,
    pub character_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Generate a message id of the form `msg_<YYYYMMDD_HHMMSS>_<8 hex>`.
    ///
    /// Two ids generated within the same second share a prefix, so the
    /// storage unique index remains the actual uniqueness guarantee.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("msg_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
    }

    /// Derived metadata as stored on the record.
    pub fn metadata(&self) -> MessageMetadata {
        MessageMetadata {
            word_count: self.word_count,
            character_count: self.character_count,
        }
    }

    /// The caller-visible representation of this record.
    pub fn to_view(&self) -> MessageView {
        MessageView {
            message_id: self.message_id.clone(),
            session_id: self.session_id.clone(),
            content: self.content.clone(),
            timestamp: format_timestamp(&self.timestamp),
            sender: self.sender,
            metadata: self.metadata(),
        }
    }
}

/// External view of a message returned by every read and create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: String,
    pub session_id: String,
    pub content: String,
    /// ISO-8601 UTC timestamp with a trailing `Z`.
    pub timestamp: String,
    pub sender: Sender,
    pub metadata: MessageMetadata,
}

/// Format a timestamp for callers: `YYYY-MM-DDTHH:MM:SSZ`, with six
/// fractional digits only when the sub-second part is non-zero.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.timestamp_subsec_micros() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

/// Pagination block of a session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of a session's messages, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessages {
    pub messages: Vec<MessageView>,
    pub pagination: SessionPagination,
}

/// Pagination block of a global search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPagination {
    pub total_results: u64,
    pub limit: u32,
    pub offset: u32,
    /// Offset of the next page, `null` on the last page.
    pub next_offset: Option<u32>,
}

/// One page of global search results, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub data: Vec<MessageView>,
    pub pagination: SearchPagination,
}

/// Message counts for a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub session_id: String,
    pub total_messages: u64,
    pub user_messages: u64,
    pub system_messages: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
