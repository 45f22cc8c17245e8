//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `missive-core` using sqlx with split
//! read/write pools.

use chrono::{DateTime, Utc};
use missive_core::repository::message::MessageRepository;
use missive_types::error::RepositoryError;
use missive_types::message::{MessageRecord, Sender};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a domain `MessageRecord`.
struct MessageRow {
    message_id: String,
    session_id: String,
    content: String,
    sender: String,
    timestamp: String,
    word_count: i64,
    character_count: i64,
    created_at: String,
    updated_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            message_id: row.try_get("message_id")?,
            session_id: row.try_get("session_id")?,
            content: row.try_get("content")?,
            sender: row.try_get("sender")?,
            timestamp: row.try_get("timestamp")?,
            word_count: row.try_get("word_count")?,
            character_count: row.try_get("character_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<MessageRecord, RepositoryError> {
        let sender: Sender = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(MessageRecord {
            message_id: self.message_id,
            session_id: self.session_id,
            content: self.content,
            sender,
            timestamp: parse_datetime(&self.timestamp)?,
            word_count: to_u32(self.word_count, "word_count")?,
            character_count: to_u32(self.character_count, "character_count")?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Query(format!("invalid {column}: {value}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC text so that lexical order equals chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Wrap a query in `%...%`, escaping LIKE wildcards so they match literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn rows_to_records(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<MessageRecord>, RepositoryError> {
    rows.iter()
        .map(|row| {
            MessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_record()
        })
        .collect()
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

impl MessageRepository for SqliteMessageRepository {
    async fn save(&self, record: &MessageRecord) -> Result<MessageRecord, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO messages (message_id, session_id, content, sender, timestamp, word_count, character_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.message_id)
        .bind(&record.session_id)
        .bind(&record.content)
        .bind(record.sender.as_str())
        .bind(format_datetime(&record.timestamp))
        .bind(i64::from(record.word_count))
        .bind(i64::from(record.character_count))
        .bind(format_datetime(&record.created_at))
        .bind(format_datetime(&record.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(record.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "message_id '{}' already exists",
                    record.message_id
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn find_by_id(&self, message_id: &str) -> Result<Option<MessageRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE message_id = ?")
            .bind(message_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let message_row =
                    MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(message_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_session(
        &self,
        session_id: &str,
        limit: u32,
        offset: u32,
        sender: Option<Sender>,
    ) -> Result<(Vec<MessageRecord>, u64), RepositoryError> {
        let total = self.count_by_session(session_id, sender).await?;

        let rows = match sender {
            Some(sender) => {
                sqlx::query(
                    "SELECT * FROM messages WHERE session_id = ? AND sender = ?
                     ORDER BY timestamp ASC, id ASC LIMIT ? OFFSET ?",
                )
                .bind(session_id)
                .bind(sender.as_str())
                .bind(i64::from(limit))
                .bind(i64::from(offset))
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM messages WHERE session_id = ?
                     ORDER BY timestamp ASC, id ASC LIMIT ? OFFSET ?",
                )
                .bind(session_id)
                .bind(i64::from(limit))
                .bind(i64::from(offset))
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok((rows_to_records(&rows)?, total))
    }

    async fn count_by_session(
        &self,
        session_id: &str,
        sender: Option<Sender>,
    ) -> Result<u64, RepositoryError> {
        let count: i64 = match sender {
            Some(sender) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM messages WHERE session_id = ? AND sender = ?",
                )
                .bind(session_id)
                .bind(sender.as_str())
                .fetch_one(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE session_id = ?")
                    .bind(session_id)
                    .fetch_one(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count_to_u64(count))
    }

    async fn exists_by_id(&self, message_id: &str) -> Result<bool, RepositoryError> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM messages WHERE message_id = ?)")
                .bind(message_id)
                .fetch_one(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(exists != 0)
    }

    async fn delete_by_id(&self, message_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(message_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<MessageRecord>, u64), RepositoryError> {
        let pattern = like_pattern(query);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE content LIKE ? ESCAPE '\\'")
                .bind(&pattern)
                .fetch_one(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let rows = sqlx::query(
            "SELECT * FROM messages WHERE content LIKE ? ESCAPE '\\'
             ORDER BY timestamp DESC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(&pattern)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok((rows_to_records(&rows)?, count_to_u64(total)))
    }

    async fn list_session_ids(&self, limit: u32) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar(
            "SELECT session_id FROM messages GROUP BY session_id
             ORDER BY MAX(timestamp) DESC, session_id ASC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use missive_types::message::MessageMetadata;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_message(id: &str, session: &str, sender: Sender, content: &str, second: u32) -> MessageRecord {
        let ts = Utc.with_ymd_and_hms(2023, 6, 15, 14, 30, second).unwrap();
        let meta = MessageMetadata::from_content(content);
        MessageRecord {
            message_id: id.to_string(),
            session_id: session.to_string(),
            content: content.to_string(),
            sender,
            timestamp: ts,
            word_count: meta.word_count,
            character_count: meta.character_count,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let mut msg = make_message("m1", "s1", Sender::User, "hello world", 0);
        msg.timestamp += chrono::Duration::microseconds(250);

        repo.save(&msg).await.unwrap();

        let found = repo.find_by_id("m1").await.unwrap().unwrap();
        assert_eq!(found, msg);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let msg = make_message("m1", "s1", Sender::User, "hello", 0);

        repo.save(&msg).await.unwrap();
        let err = repo.save(&msg).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(repo.exists_by_id("m1").await.unwrap());
        assert!(!repo.exists_by_id("m2").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_session_orders_and_paginates() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("c", "s1", Sender::User, "third", 2)).await.unwrap();
        repo.save(&make_message("a", "s1", Sender::User, "first", 0)).await.unwrap();
        repo.save(&make_message("b", "s1", Sender::System, "second", 1)).await.unwrap();
        repo.save(&make_message("x", "s2", Sender::User, "other", 0)).await.unwrap();

        let (page, total) = repo.find_by_session("s1", 2, 0, None).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = page.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let (page, _) = repo.find_by_session("s1", 2, 2, None).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].message_id, "c");

        let (page, total) = repo
            .find_by_session("s1", 10, 0, Some(Sender::System))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].message_id, "b");
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        for id in ["z", "y", "x"] {
            repo.save(&make_message(id, "s1", Sender::User, "same time", 0))
                .await
                .unwrap();
        }

        let (page, _) = repo.find_by_session("s1", 10, 0, None).await.unwrap();
        let ids: Vec<&str> = page.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }

    #[tokio::test]
    async fn test_count_by_session() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "s1", Sender::User, "one", 0)).await.unwrap();
        repo.save(&make_message("b", "s1", Sender::User, "two", 1)).await.unwrap();
        repo.save(&make_message("c", "s1", Sender::System, "three", 2)).await.unwrap();

        assert_eq!(repo.count_by_session("s1", None).await.unwrap(), 3);
        assert_eq!(repo.count_by_session("s1", Some(Sender::User)).await.unwrap(), 2);
        assert_eq!(repo.count_by_session("s1", Some(Sender::System)).await.unwrap(), 1);
        assert_eq!(repo.count_by_session("ghost", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_case_insensitive_newest_first() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "s1", Sender::User, "Hello there", 0)).await.unwrap();
        repo.save(&make_message("b", "s2", Sender::System, "say HELLO", 5)).await.unwrap();
        repo.save(&make_message("c", "s2", Sender::User, "goodbye", 9)).await.unwrap();

        let (results, total) = repo.search("hello", 10, 0).await.unwrap();
        assert_eq!(total, 2);
        let ids: Vec<&str> = results.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let (results, total) = repo.search("hello", 1, 1).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(results[0].message_id, "a");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "s1", Sender::User, "100% done", 0)).await.unwrap();
        repo.save(&make_message("b", "s1", Sender::User, "1000 done", 1)).await.unwrap();
        repo.save(&make_message("c", "s1", Sender::User, "snake_case", 2)).await.unwrap();

        let (results, total) = repo.search("0% d", 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(results[0].message_id, "a");

        let (_, total) = repo.search("e_c", 10, 0).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "s1", Sender::User, "meet at the CAFÉ", 0)).await.unwrap();

        let (_, total) = repo.search("the café", 10, 0).await.unwrap();
        assert_eq!(total, 0);

        let (_, total) = repo.search("the CAFÉ", 10, 0).await.unwrap();
        assert_eq!(total, 1);

        let (_, total) = repo.search("THE caf", 10, 0).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "s1", Sender::User, "bye", 0)).await.unwrap();

        assert!(repo.delete_by_id("a").await.unwrap());
        assert!(!repo.delete_by_id("a").await.unwrap());
        assert!(repo.find_by_id("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_session_ids_by_recent_activity() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.save(&make_message("a", "old", Sender::User, "one", 0)).await.unwrap();
        repo.save(&make_message("b", "new", Sender::User, "two", 10)).await.unwrap();
        repo.save(&make_message("c", "old", Sender::User, "three", 5)).await.unwrap();

        assert_eq!(repo.list_session_ids(10).await.unwrap(), vec!["new", "old"]);
        assert_eq!(repo.list_session_ids(1).await.unwrap(), vec!["new"]);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2023, 6, 15, 14, 30, 0).unwrap();
        assert_eq!(format_datetime(&ts), "2023-06-15T14:30:00.000000Z");
        assert_eq!(parse_datetime(&format_datetime(&ts)).unwrap(), ts);
    }
}
