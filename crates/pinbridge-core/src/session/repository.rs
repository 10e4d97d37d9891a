//! SessionRepository trait definition.
//!
//! Follows the same RPITIT pattern as `IdentityRepository`.

use chrono::{DateTime, Utc};
use pinbridge_types::error::RepositoryError;
use pinbridge_types::session::ChatSession;
use uuid::Uuid;

/// Repository trait for registration session persistence.
///
/// Implementations: `SqliteSessionRepository` (pinbridge-infra) and
/// [`InMemorySessionRepository`](crate::session::memory::InMemorySessionRepository).
pub trait SessionRepository: Send + Sync {
    /// Insert `candidate` unless its chat already has an open session.
    ///
    /// Returns the open session for the chat and `true` if `candidate` was the
    /// one stored. At most one open session per chat may exist; concurrent
    /// callers for the same chat all observe the same session.
    fn find_or_create_open(
        &self,
        candidate: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(ChatSession, bool), RepositoryError>> + Send;

    /// Get a session by its unique id.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Set the pin on an open session.
    ///
    /// Returns `RepositoryError::NotFound` if no open session has that id.
    fn set_pin(
        &self,
        session_id: &Uuid,
        pin: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Flip an open session to completed.
    ///
    /// Returns `RepositoryError::NotFound` if no open session has that id.
    fn mark_completed(
        &self,
        session_id: &Uuid,
        completed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Open sessions that already carry a pin, oldest first.
    fn list_pending(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;
}
