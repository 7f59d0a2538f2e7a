//! Chat session snapshots
//!
//! The live transcript is held in memory by the session store in
//! `coach-core`; this table keeps the latest copy per (user, topic) so a
//! conversation can be inspected after a restart.

use chrono::{DateTime, Utc};
use coach_core::{SessionKey, Transcript};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::backend::StorageError;
use crate::sqlite::SqliteBackend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub transcript: Transcript,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChatSessionStore {
    backend: SqliteBackend,
}

impl ChatSessionStore {
    pub fn new(backend: SqliteBackend) -> Self {
        Self { backend }
    }

    /// Upsert the snapshot for `key`.
    ///
    /// Transcripts only grow, so a snapshot never replaces one with more
    /// messages. Saves that land out of order keep the newest copy.
    pub async fn save(&self, key: &SessionKey, transcript: &Transcript) -> Result<(), StorageError> {
        let messages = serde_json::to_string(transcript)?;
        let message_count = transcript.len() as i64;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO chat_sessions (id, user_id, topic, messages, message_count, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, topic) DO UPDATE SET \
                 messages = excluded.messages, \
                 message_count = excluded.message_count, \
                 updated_at = excluded.updated_at \
             WHERE excluded.message_count > chat_sessions.message_count",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&key.user_id)
        .bind(&key.topic)
        .bind(messages)
        .bind(message_count)
        .bind(now)
        .bind(now)
        .execute(self.backend.pool())
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(session = %key, message_count, "Skipped stale session snapshot");
        }

        Ok(())
    }

    pub async fn load(&self, key: &SessionKey) -> Result<Option<ChatSession>, StorageError> {
        let Some(row) = sqlx::query(
            "SELECT id, user_id, topic, messages, created_at, updated_at \
             FROM chat_sessions WHERE user_id = ? AND topic = ?",
        )
        .bind(&key.user_id)
        .bind(&key.topic)
        .fetch_optional(self.backend.pool())
        .await?
        else {
            return Ok(None);
        };

        let messages: String = row.try_get("messages")?;
        Ok(Some(ChatSession {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            topic: row.try_get("topic")?,
            transcript: serde_json::from_str(&messages)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}
