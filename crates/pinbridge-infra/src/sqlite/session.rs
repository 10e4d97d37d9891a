//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `pinbridge-core`. The partial unique
//! index `idx_chat_sessions_open_chat` (`chat_id WHERE state = 'open'`) is the
//! guard against two open sessions for one chat.

use chrono::{DateTime, Utc};
use pinbridge_core::session::repository::SessionRepository;
use pinbridge_types::error::RepositoryError;
use pinbridge_types::session::{ChatSession, SessionState};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `SessionRepository`.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    chat_id: i64,
    display_name: String,
    pin_code: Option<String>,
    state: String,
    created_at: String,
    completed_at: Option<String>,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            display_name: row.try_get("display_name")?,
            pin_code: row.try_get("pin_code")?,
            state: row.try_get("state")?,
            created_at: row.try_get("created_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let state: SessionState = self
            .state
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let completed_at = self
            .completed_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?;

        Ok(ChatSession {
            id,
            chat_id: self.chat_id,
            display_name: self.display_name,
            pin_code: self.pin_code,
            state,
            created_at: parse_datetime(&self.created_at)?,
            completed_at,
        })
    }
}

fn into_session(row: &sqlx::sqlite::SqliteRow) -> Result<ChatSession, RepositoryError> {
    ChatSessionRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_session()
}

impl SessionRepository for SqliteSessionRepository {
    async fn find_or_create_open(
        &self,
        candidate: &ChatSession,
    ) -> Result<(ChatSession, bool), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let inserted = sqlx::query(
            r#"INSERT INTO chat_sessions (id, chat_id, display_name, pin_code, state, created_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(candidate.id.to_string())
        .bind(candidate.chat_id)
        .bind(&candidate.display_name)
        .bind(&candidate.pin_code)
        .bind(SessionState::Open.to_string())
        .bind(format_datetime(&candidate.created_at))
        .bind(candidate.completed_at.as_ref().map(format_datetime))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?
        .rows_affected()
            == 1;

        let row = sqlx::query("SELECT * FROM chat_sessions WHERE chat_id = ? AND state = 'open'")
            .bind(candidate.chat_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        let row = row.ok_or_else(|| {
            RepositoryError::Query(format!(
                "no open session for chat {} after insert",
                candidate.chat_id
            ))
        })?;
        Ok((into_session(&row)?, inserted))
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(into_session).transpose()
    }

    async fn set_pin(&self, session_id: &Uuid, pin: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE chat_sessions SET pin_code = ? WHERE id = ? AND state = 'open'")
                .bind(pin)
                .bind(session_id.to_string())
                .execute(&self.pool.writer)
                .await
                .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn mark_completed(
        &self,
        session_id: &Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chat_sessions SET state = 'completed', completed_at = ? WHERE id = ? AND state = 'open'",
        )
        .bind(format_datetime(&completed_at))
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE state = 'open' AND pin_code IS NOT NULL ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            sessions.push(into_session(row)?);
        }

        Ok(sessions)
    }
}
