//! Rule-table validation for incoming message candidates.
//!
//! A candidate is the raw JSON object received from a caller. Validation runs
//! in two passes over the same table of [`FieldRule`]s:
//!
//! 1. **Presence** -- every required field that is absent, `null`, or a blank
//!    string is collected and reported together as `MissingFields`.
//! 2. **Format** -- each present field is checked against its kind (string
//!    length bounds, enum membership, ISO-8601 timestamp). The first failure
//!    is reported as `InvalidFormat`.
//!
//! The result is a typed [`ValidatedMessage`]; nothing is persisted here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value, json};

use missive_types::config::ValidationConfig;
use missive_types::error::MessageError;
use missive_types::message::{MAX_CONTENT_LENGTH, MAX_ID_LENGTH, Sender};

/// Example shown to callers when a timestamp fails to parse.
pub const TIMESTAMP_EXAMPLE: &str = "2023-06-15T14:30:00Z";

/// Naive layouts accepted after RFC 3339; interpreted as UTC.
const OFFSET_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// How a single field is checked once it is known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-blank string of at most `max_chars` characters.
    Text { max_chars: usize },
    /// String drawn from a closed set.
    OneOf(&'static [&'static str]),
    /// ISO-8601 timestamp string.
    Timestamp,
}

/// One row of the validation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// A candidate that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMessage {
    pub message_id: Option<String>,
    pub session_id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Validator driven by a fixed rule table.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    rules: [FieldRule; 5],
}

impl MessageValidator {
    /// Build the rule table. In strict mode all five fields are required.
    pub fn new(config: ValidationConfig) -> Self {
        let strict = config.strict;
        Self {
            rules: [
                FieldRule {
                    name: "session_id",
                    required: true,
                    kind: FieldKind::Text {
                        max_chars: MAX_ID_LENGTH,
                    },
                },
                FieldRule {
                    name: "content",
                    required: true,
                    kind: FieldKind::Text {
                        max_chars: MAX_CONTENT_LENGTH,
                    },
                },
                FieldRule {
                    name: "sender",
                    required: true,
                    kind: FieldKind::OneOf(&Sender::VALID),
                },
                FieldRule {
                    name: "message_id",
                    required: strict,
                    kind: FieldKind::Text {
                        max_chars: MAX_ID_LENGTH,
                    },
                },
                FieldRule {
                    name: "timestamp",
                    required: strict,
                    kind: FieldKind::Timestamp,
                },
            ],
        }
    }

    /// Run both passes and return the typed message.
    pub fn validate(&self, candidate: &Map<String, Value>) -> Result<ValidatedMessage, MessageError> {
        self.check_required(candidate)?;

        for rule in &self.rules {
            if let Some(value) = present(candidate, rule.name) {
                check_field(rule, value)?;
            }
        }

        // Both passes succeeded, so required fields are non-blank strings.
        let text = |name: &str| {
            present(candidate, name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let sender = text("sender")
            .and_then(|s| s.parse::<Sender>().ok())
            .ok_or_else(|| MessageError::MissingFields(vec!["sender".to_string()]))?;

        Ok(ValidatedMessage {
            message_id: text("message_id"),
            session_id: text("session_id")
                .ok_or_else(|| MessageError::MissingFields(vec!["session_id".to_string()]))?,
            content: text("content")
                .ok_or_else(|| MessageError::MissingFields(vec!["content".to_string()]))?,
            sender,
            timestamp: text("timestamp").as_deref().and_then(parse_timestamp),
        })
    }

    /// Report every required field that is absent, null, or blank.
    pub fn check_required(&self, candidate: &Map<String, Value>) -> Result<(), MessageError> {
        let missing: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| rule.required && present(candidate, rule.name).is_none())
            .map(|rule| rule.name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MessageError::MissingFields(missing))
        }
    }
}

impl Default for MessageValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// A field counts as present unless it is absent, null, or a blank string.
fn present<'a>(candidate: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match candidate.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

/// Check one present field against its rule.
fn check_field(rule: &FieldRule, value: &Value) -> Result<(), MessageError> {
    let name = rule.name;
    let Some(s) = value.as_str() else {
        return Err(MessageError::invalid_format(
            name,
            format!("{name} must be a string"),
        ));
    };

    match rule.kind {
        FieldKind::Text { max_chars } => {
            if s.trim().is_empty() {
                return Err(MessageError::invalid_format(
                    name,
                    format!("{name} cannot be empty"),
                ));
            }
            if s.chars().count() > max_chars {
                return Err(MessageError::invalid_format(
                    name,
                    format!("{name} cannot exceed {max_chars} characters"),
                ));
            }
        }
        FieldKind::OneOf(allowed) => {
            if !allowed.contains(&s) {
                let mut details = Map::new();
                details.insert(format!("valid_{name}s"), json!(allowed));
                return Err(MessageError::InvalidFormat {
                    field: name.to_string(),
                    message: format!("{name} must be one of: {}", allowed.join(", ")),
                    details: Some(Value::Object(details)),
                });
            }
        }
        FieldKind::Timestamp => {
            if parse_timestamp(s).is_none() {
                return Err(MessageError::invalid_format(
                    name,
                    format!("{name} must be in ISO 8601 format (e.g. {TIMESTAMP_EXAMPLE})"),
                ));
            }
        }
    }

    Ok(())
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts date-times with a `T` or space separator, minute or second
/// precision, optional fractional seconds and an optional `Z`, `±HH:MM`,
/// `±HHMM` or `±HH` offset. Naive date-times are taken as UTC and bare dates
/// as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };
    for format in OFFSET_TIMESTAMP_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
