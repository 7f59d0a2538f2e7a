//! Storage errors and the debate persistence sink

use async_trait::async_trait;
use coach_core::DebateRecord;
use std::fmt::Debug;
use tokio::sync::RwLock;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::AlreadyExists(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StorageError::NotFound(e.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::Connection(e.to_string())
            }
            _ => StorageError::Query(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Where analyzed debate messages go. Write-only from the pipeline's view.
#[async_trait]
pub trait DebateSink: Send + Sync + Debug {
    async fn record(&self, record: &DebateRecord) -> Result<(), StorageError>;
}

/// In-memory sink (for testing)
#[derive(Debug, Default)]
pub struct MemoryDebateSink {
    records: RwLock<Vec<DebateRecord>>,
}

impl MemoryDebateSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in write order
    pub async fn records(&self) -> Vec<DebateRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl DebateSink for MemoryDebateSink {
    async fn record(&self, record: &DebateRecord) -> Result<(), StorageError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{fallback_record, DebateTurn};

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemoryDebateSink::new();
        let turn = DebateTurn::from_parts(Some("u1"), Some("Topic"), Some("for"), Some("Arg"), None).unwrap();
        let record = DebateRecord::new(&turn, &fallback_record("Topic", turn.position));

        sink.record(&record).await.unwrap();

        let records = sink.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].score, 7);
    }
}
