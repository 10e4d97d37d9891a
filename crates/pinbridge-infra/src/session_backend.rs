//! Runtime selection between the durable and in-memory session stores.

use chrono::{DateTime, Utc};
use pinbridge_core::session::memory::InMemorySessionRepository;
use pinbridge_core::session::repository::SessionRepository;
use pinbridge_types::config::SessionBackend;
use pinbridge_types::error::RepositoryError;
use pinbridge_types::session::ChatSession;
use uuid::Uuid;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::session::SqliteSessionRepository;

/// Session repository chosen by `[sessions] backend` in the config file.
pub enum AnySessionRepository {
    Sqlite(SqliteSessionRepository),
    Memory(InMemorySessionRepository),
}

impl AnySessionRepository {
    pub fn from_config(backend: SessionBackend, pool: &DatabasePool) -> Self {
        match backend {
            SessionBackend::Sqlite => Self::Sqlite(SqliteSessionRepository::new(pool.clone())),
            SessionBackend::Memory => Self::Memory(InMemorySessionRepository::new()),
        }
    }
}

impl SessionRepository for AnySessionRepository {
    async fn find_or_create_open(
        &self,
        candidate: &ChatSession,
    ) -> Result<(ChatSession, bool), RepositoryError> {
        match self {
            Self::Sqlite(repo) => repo.find_or_create_open(candidate).await,
            Self::Memory(repo) => repo.find_or_create_open(candidate).await,
        }
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        match self {
            Self::Sqlite(repo) => repo.get_session(session_id).await,
            Self::Memory(repo) => repo.get_session(session_id).await,
        }
    }

    async fn set_pin(&self, session_id: &Uuid, pin: &str) -> Result<(), RepositoryError> {
        match self {
            Self::Sqlite(repo) => repo.set_pin(session_id, pin).await,
            Self::Memory(repo) => repo.set_pin(session_id, pin).await,
        }
    }

    async fn mark_completed(
        &self,
        session_id: &Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Sqlite(repo) => repo.mark_completed(session_id, completed_at).await,
            Self::Memory(repo) => repo.mark_completed(session_id, completed_at).await,
        }
    }

    async fn list_pending(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        match self {
            Self::Sqlite(repo) => repo.list_pending().await,
            Self::Memory(repo) => repo.list_pending().await,
        }
    }
}
