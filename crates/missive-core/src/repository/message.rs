//! Message repository trait definition.
//!
//! Defines the storage interface for chat messages. The infrastructure layer
//! (missive-infra) implements this trait with SQLite persistence.

use missive_types::error::RepositoryError;
use missive_types::message::{MessageRecord, Sender};

/// Repository trait for message persistence.
///
/// Ordering contract:
/// - session listings are ordered by timestamp ASC (oldest first),
/// - global search is ordered by timestamp DESC (most recent first),
///
/// with ties broken by insertion order in both cases.
///
/// `message_id` uniqueness must be enforced by the store itself: `save`
/// returns `Conflict` when the id already exists.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageRepository: Send + Sync {
    /// Persist a new message atomically. Returns the stored record.
    fn save(
        &self,
        record: &MessageRecord,
    ) -> impl std::future::Future<Output = Result<MessageRecord, RepositoryError>> + Send;

    /// Look up a message by its public id.
    fn find_by_id(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<MessageRecord>, RepositoryError>> + Send;

    /// One page of a session's messages plus the total matching the filter.
    fn find_by_session(
        &self,
        session_id: &str,
        limit: u32,
        offset: u32,
        sender: Option<Sender>,
    ) -> impl std::future::Future<Output = Result<(Vec<MessageRecord>, u64), RepositoryError>> + Send;

    /// Count a session's messages, optionally restricted to one sender.
    fn count_by_session(
        &self,
        session_id: &str,
        sender: Option<Sender>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn exists_by_id(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a message. Returns `true` if a row was removed.
    fn delete_by_id(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Case-insensitive substring search on content across all sessions.
    fn search(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> impl std::future::Future<Output = Result<(Vec<MessageRecord>, u64), RepositoryError>> + Send;

    /// Distinct session ids, most recently active first.
    fn list_session_ids(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;
}
