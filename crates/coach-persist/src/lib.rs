//! # Debate Coach Persistence
//!
//! SQLite storage for users, analyzed debate messages and chat session
//! snapshots.

pub mod backend;
pub mod debate_store;
pub mod session_store;
pub mod sqlite;
pub mod user_store;

pub use backend::{DebateSink, MemoryDebateSink, StorageError};
pub use debate_store::DebateStore;
pub use session_store::{ChatSession, ChatSessionStore};
pub use sqlite::{SqliteBackend, SqliteConfig};
pub use user_store::{UserRecord, UserStore};
