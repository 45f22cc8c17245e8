//! Message service: the create pipeline and every read-side query.
//!
//! Generic over `MessageRepository` so the storage backend is injected at
//! startup and tests can run against an in-memory mock.

use chrono::{SubsecRound, Utc};
use serde_json::{Map, Value};

use missive_types::config::AppConfig;
use missive_types::error::{MessageError, RepositoryError};
use missive_types::message::{
    MessageMetadata, MessageRecord, MessageView, SearchPagination, SearchResults, Sender,
    SessionMessages, SessionPagination, SessionStatistics,
};

use crate::filter::ContentFilter;
use crate::pagination::PaginationNormalizer;
use crate::repository::message::MessageRepository;
use crate::validation::MessageValidator;

/// Minimum trimmed length of a global search query.
pub const MIN_SEARCH_QUERY_CHARS: usize = 3;

/// Orchestrates validation, filtering and persistence of chat messages.
pub struct MessageService<R: MessageRepository> {
    repo: R,
    validator: MessageValidator,
    filter: ContentFilter,
    paginator: PaginationNormalizer,
}

impl<R: MessageRepository> MessageService<R> {
    pub fn new(
        repo: R,
        validator: MessageValidator,
        filter: ContentFilter,
        paginator: PaginationNormalizer,
    ) -> Self {
        Self {
            repo,
            validator,
            filter,
            paginator,
        }
    }

    /// Build a service from the loaded application configuration.
    pub fn with_config(repo: R, config: &AppConfig) -> Self {
        Self::new(
            repo,
            MessageValidator::new(config.validation),
            ContentFilter::new(config.content.forbidden_words.iter().cloned()),
            PaginationNormalizer::from(config.pagination),
        )
    }

    pub fn paginator(&self) -> &PaginationNormalizer {
        &self.paginator
    }

    /// Validate, filter and persist a raw candidate.
    ///
    /// Steps run in a fixed order: required fields, field formats, duplicate
    /// id, forbidden words, then the insert. The first failing step wins.
    pub async fn process_message(
        &self,
        candidate: &Map<String, Value>,
    ) -> Result<MessageView, MessageError> {
        let validated = self.validator.validate(candidate)?;

        if let Some(id) = validated.message_id.as_deref()
            && self.repo.exists_by_id(id).await.map_err(storage_error)?
        {
            return Err(duplicate_id(id));
        }

        self.filter.check(&validated.content)?;

        let now = Utc::now().trunc_subsecs(6);
        let message_id = validated
            .message_id
            .unwrap_or_else(|| MessageRecord::generate_id(now));
        let metadata = MessageMetadata::from_content(&validated.content);

        let record = MessageRecord {
            message_id,
            session_id: validated.session_id,
            content: validated.content,
            sender: validated.sender,
            timestamp: validated
                .timestamp
                .map(|ts| ts.trunc_subsecs(6))
                .unwrap_or(now),
            word_count: metadata.word_count,
            character_count: metadata.character_count,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repo.save(&record).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => duplicate_id(&record.message_id),
            other => storage_error(other),
        })?;

        tracing::info!(
            message_id = %stored.message_id,
            session_id = %stored.session_id,
            sender = %stored.sender,
            "Message stored"
        );

        Ok(stored.to_view())
    }

    /// One page of a session's messages, oldest first.
    ///
    /// An empty `sender` means no filter.
    pub async fn get_messages_by_session(
        &self,
        session_id: &str,
        limit: i64,
        offset: i64,
        sender: Option<&str>,
    ) -> Result<SessionMessages, MessageError> {
        let sender = match sender.map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(raw.parse::<Sender>().map_err(|_| {
                MessageError::Validation(format!(
                    "invalid sender filter '{raw}', expected one of: {}",
                    Sender::VALID.join(", ")
                ))
            })?),
        };

        let window = self.paginator.normalize(limit, offset);
        let (records, total) = self
            .repo
            .find_by_session(session_id, window.limit, window.offset, sender)
            .await
            .map_err(storage_error)?;

        tracing::debug!(session_id, total, returned = records.len(), "Listed session messages");

        Ok(SessionMessages {
            messages: records.iter().map(MessageRecord::to_view).collect(),
            pagination: SessionPagination {
                total,
                limit: window.limit,
                offset: window.offset,
                has_next: window.has_next(total),
                has_prev: window.has_prev(),
            },
        })
    }

    pub async fn get_message_by_id(&self, message_id: &str) -> Result<MessageView, MessageError> {
        self.repo
            .find_by_id(message_id)
            .await
            .map_err(storage_error)?
            .map(|record| record.to_view())
            .ok_or_else(|| not_found(message_id))
    }

    /// Total, user and system message counts. An unknown session is all zeros.
    pub async fn get_session_statistics(
        &self,
        session_id: &str,
    ) -> Result<SessionStatistics, MessageError> {
        let total_messages = self
            .repo
            .count_by_session(session_id, None)
            .await
            .map_err(storage_error)?;
        let user_messages = self
            .repo
            .count_by_session(session_id, Some(Sender::User))
            .await
            .map_err(storage_error)?;
        let system_messages = self
            .repo
            .count_by_session(session_id, Some(Sender::System))
            .await
            .map_err(storage_error)?;

        Ok(SessionStatistics {
            session_id: session_id.to_string(),
            total_messages,
            user_messages,
            system_messages,
        })
    }

    /// Case-insensitive content search across every session, newest first.
    pub async fn search_messages_globally(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<SearchResults, MessageError> {
        if query.trim().chars().count() < MIN_SEARCH_QUERY_CHARS {
            return Err(MessageError::SearchQueryTooShort {
                min: MIN_SEARCH_QUERY_CHARS,
            });
        }

        let window = self.paginator.normalize(limit, offset);
        let (records, total_results) = self
            .repo
            .search(query, window.limit, window.offset)
            .await
            .map_err(storage_error)?;

        tracing::debug!(query, total_results, "Searched messages");

        Ok(SearchResults {
            data: records.iter().map(MessageRecord::to_view).collect(),
            pagination: SearchPagination {
                total_results,
                limit: window.limit,
                offset: window.offset,
                next_offset: window.next_offset(total_results),
            },
        })
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<(), MessageError> {
        let deleted = self
            .repo
            .delete_by_id(message_id)
            .await
            .map_err(storage_error)?;
        if !deleted {
            return Err(not_found(message_id));
        }

        tracing::info!(message_id, "Message deleted");
        Ok(())
    }

    /// Distinct session ids, most recently active first.
    pub async fn list_session_ids(&self, limit: i64) -> Result<Vec<String>, MessageError> {
        let window = self.paginator.normalize(limit, 0);
        self.repo
            .list_session_ids(window.limit)
            .await
            .map_err(storage_error)
    }
}

fn duplicate_id(message_id: &str) -> MessageError {
    MessageError::Validation(format!("message with id '{message_id}' already exists"))
}

fn not_found(message_id: &str) -> MessageError {
    MessageError::NotFound(format!("message '{message_id}' not found"))
}

fn storage_error(err: RepositoryError) -> MessageError {
    tracing::error!(error = %err, "Message storage failure");
    MessageError::Database(err.to_string())
}
