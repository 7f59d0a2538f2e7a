//! Debate record storage

use async_trait::async_trait;
use coach_core::{DebateRecord, FeedbackRecord, Position};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::backend::{DebateSink, StorageError};
use crate::sqlite::SqliteBackend;

/// SQLite-backed store of analyzed debate messages.
///
/// Rows are insert-only; nothing here updates or deletes a record.
#[derive(Debug, Clone)]
pub struct DebateStore {
    backend: SqliteBackend,
}

impl DebateStore {
    pub fn new(backend: SqliteBackend) -> Self {
        Self { backend }
    }

    pub async fn insert(&self, record: &DebateRecord) -> Result<(), StorageError> {
        let feedback = serde_json::to_string(&record.feedback)?;

        sqlx::query(
            "INSERT INTO debates (id, user_id, topic, position, arguments, feedback, score, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.user_id)
        .bind(&record.topic)
        .bind(record.position.as_str())
        .bind(&record.argument_text)
        .bind(feedback)
        .bind(i64::from(record.score))
        .bind(record.created_at)
        .execute(self.backend.pool())
        .await?;

        tracing::debug!(debate_id = %record.id, user_id = %record.user_id, score = record.score, "Stored debate record");
        Ok(())
    }

    /// A user's records, newest first
    pub async fn list_for_user(&self, user_id: &str, limit: u32) -> Result<Vec<DebateRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, topic, position, arguments, feedback, score, created_at \
             FROM debates WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(self.backend.pool())
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<DebateRecord, StorageError> {
    let id: String = row.try_get("id")?;
    let position: String = row.try_get("position")?;
    let feedback: String = row.try_get("feedback")?;
    let score: i64 = row.try_get("score")?;

    Ok(DebateRecord {
        id: Uuid::parse_str(&id).map_err(|e| StorageError::Serialization(e.to_string()))?,
        user_id: row.try_get("user_id")?,
        topic: row.try_get("topic")?,
        position: position
            .parse::<Position>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
        argument_text: row.try_get("arguments")?,
        feedback: serde_json::from_str::<FeedbackRecord>(&feedback)?,
        score: u8::try_from(score).map_err(|e| StorageError::Serialization(e.to_string()))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl DebateSink for DebateStore {
    async fn record(&self, record: &DebateRecord) -> Result<(), StorageError> {
        self.insert(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteConfig;
    use chrono::{Duration, Utc};
    use coach_core::{fallback_record, DebateTurn};

    fn record(user: &str, argument: &str, minutes_ago: i64) -> DebateRecord {
        let turn = DebateTurn::from_parts(Some(user), Some("School uniforms"), Some("against"), Some(argument), None)
            .unwrap();
        let mut record = DebateRecord::new(&turn, &fallback_record(&turn.topic, turn.position));
        record.created_at = Utc::now() - Duration::minutes(minutes_ago);
        record
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let store = DebateStore::new(SqliteBackend::new_with_config(SqliteConfig::memory()).await.unwrap());

        let older = record("u1", "first argument", 10);
        let newer = record("u1", "second argument", 1);
        let other = record("u2", "someone else", 5);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&other).await.unwrap();

        let listed = store.list_for_user("u1", 50).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert_eq!(listed[0].feedback, newer.feedback);
        assert_eq!(listed[0].position, Position::Against);

        assert_eq!(store.list_for_user("u1", 1).await.unwrap().len(), 1);
        assert!(store.list_for_user("nobody", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_are_insert_only() {
        let store = DebateStore::new(SqliteBackend::new_with_config(SqliteConfig::memory()).await.unwrap());
        let rec = record("u1", "argument", 0);
        store.record(&rec).await.unwrap();
        assert!(matches!(store.insert(&rec).await, Err(StorageError::AlreadyExists(_))));
    }
}
