//! Application State
//!
//! Centralizes access to the pipeline, the database and auth.

use std::sync::Arc;

use coach_persist::{ChatSessionStore, DebateStore, SqliteBackend, UserStore};
use coach_runtime::DebateCoach;

use crate::auth::JwtAuth;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    jwt_auth: JwtAuth,
    coach: DebateCoach,
    db: SqliteBackend,
    users: UserStore,
    debates: DebateStore,
}

impl AppState {
    /// Create new application state.
    ///
    /// The coach is wired to persist debate records and session snapshots
    /// into `db`.
    pub fn new(jwt_auth: JwtAuth, coach: DebateCoach, db: SqliteBackend) -> Self {
        let debates = DebateStore::new(db.clone());
        let coach = coach
            .with_sink(Arc::new(debates.clone()))
            .with_snapshots(ChatSessionStore::new(db.clone()));

        Self {
            jwt_auth,
            coach,
            users: UserStore::new(db.clone()),
            debates,
            db,
        }
    }

    pub fn jwt_auth(&self) -> &JwtAuth {
        &self.jwt_auth
    }

    pub fn coach(&self) -> &DebateCoach {
        &self.coach
    }

    pub fn db(&self) -> &SqliteBackend {
        &self.db
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn debates(&self) -> &DebateStore {
        &self.debates
    }
}
