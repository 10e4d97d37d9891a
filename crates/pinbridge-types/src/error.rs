use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionState;

/// Errors surfaced by the registration flow and the user query path.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Backing store unreachable, I/O failure, or deadline exceeded.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// A pin or completion was applied to a session that is not open.
    #[error("session {session_id} is {state}, expected open")]
    InvalidState {
        session_id: Uuid,
        state: SessionState,
    },

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    /// Malformed lookup key. Never reaches the store layer.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl From<RepositoryError> for RegistrationError {
    fn from(e: RepositoryError) -> Self {
        RegistrationError::StorageUnavailable(e.to_string())
    }
}

/// Errors from repository operations (used by trait definitions in pinbridge-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
