//! Session registry service.
//!
//! Wraps a [`SessionRepository`] with the session lifecycle rules: one open
//! session per chat, pins only on open sessions, completion only once.

use chrono::Utc;
use pinbridge_types::error::{RegistrationError, RepositoryError};
use pinbridge_types::session::ChatSession;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::repository::SessionRepository;

/// Result of [`SessionRegistry::find_or_create_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// A new open session was created by this call.
    Created(ChatSession),
    /// The chat already had an open session.
    Existing(ChatSession),
}

impl SessionLookup {
    pub fn session(&self) -> &ChatSession {
        match self {
            SessionLookup::Created(s) | SessionLookup::Existing(s) => s,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session().id
    }

    pub fn into_session(self) -> ChatSession {
        match self {
            SessionLookup::Created(s) | SessionLookup::Existing(s) => s,
        }
    }
}

pub struct SessionRegistry<S: SessionRepository> {
    repo: S,
}

impl<S: SessionRepository> SessionRegistry<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &S {
        &self.repo
    }

    /// Return the chat's open session, creating one if none exists.
    ///
    /// An existing session is returned unchanged; `display_name` only applies
    /// to a newly created session.
    pub async fn find_or_create_session(
        &self,
        chat_id: i64,
        display_name: &str,
    ) -> Result<SessionLookup, RegistrationError> {
        let candidate = ChatSession::open(chat_id, display_name);
        let (session, created) = self.repo.find_or_create_open(&candidate).await?;

        if created {
            info!(chat_id, session_id = %session.id, "Session opened");
            Ok(SessionLookup::Created(session))
        } else {
            debug!(chat_id, session_id = %session.id, "Session resumed");
            Ok(SessionLookup::Existing(session))
        }
    }

    /// Get a session by id.
    pub async fn get_session(&self, session_id: Uuid) -> Result<ChatSession, RegistrationError> {
        self.repo
            .get_session(&session_id)
            .await?
            .ok_or(RegistrationError::SessionNotFound(session_id))
    }

    /// Attach a pin to an open session. The session stays open.
    pub async fn attach_pin(&self, session_id: Uuid, pin: &str) -> Result<(), RegistrationError> {
        self.ensure_open(session_id).await?;

        match self.repo.set_pin(&session_id, pin).await {
            Ok(()) => {
                debug!(session_id = %session_id, "Pin attached");
                Ok(())
            }
            // Completed (or vanished) between the check and the write.
            Err(RepositoryError::NotFound) => Err(self.not_open_error(session_id).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Mark an open session completed.
    ///
    /// Only the reconciler calls this, after the identity record exists.
    pub async fn complete_session(&self, session_id: Uuid) -> Result<(), RegistrationError> {
        match self.repo.mark_completed(&session_id, Utc::now()).await {
            Ok(()) => {
                info!(session_id = %session_id, "Session completed");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(self.not_open_error(session_id).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Open sessions left with a pin but never completed.
    pub async fn pending_sessions(&self) -> Result<Vec<ChatSession>, RegistrationError> {
        Ok(self.repo.list_pending().await?)
    }

    async fn ensure_open(&self, session_id: Uuid) -> Result<ChatSession, RegistrationError> {
        let session = self.get_session(session_id).await?;
        if !session.is_open() {
            return Err(RegistrationError::InvalidState {
                session_id,
                state: session.state,
            });
        }
        Ok(session)
    }

    /// Classify a failed open-only write as missing or wrong state.
    async fn not_open_error(&self, session_id: Uuid) -> RegistrationError {
        match self.ensure_open(session_id).await {
            Err(e) => e,
            Ok(_) => RegistrationError::StorageUnavailable(format!(
                "session {session_id} is open but could not be updated"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use pinbridge_types::session::SessionState;

    use super::*;
    use crate::session::memory::InMemorySessionRepository;

    fn registry() -> SessionRegistry<InMemorySessionRepository> {
        SessionRegistry::new(InMemorySessionRepository::new())
    }

    #[tokio::test]
    async fn test_find_or_create_does_not_overwrite_name() {
        let registry = registry();

        let first = registry.find_or_create_session(42, "alice").await.unwrap();
        assert!(matches!(first, SessionLookup::Created(_)));

        let second = registry.find_or_create_session(42, "mallory").await.unwrap();
        assert!(matches!(second, SessionLookup::Existing(_)));
        assert_eq!(second.session_id(), first.session_id());
        assert_eq!(second.session().display_name, "alice");
    }

    #[tokio::test]
    async fn test_attach_pin_keeps_session_open() {
        let registry = registry();
        let id = registry
            .find_or_create_session(42, "alice")
            .await
            .unwrap()
            .session_id();

        registry.attach_pin(id, "1234").await.unwrap();

        let session = registry.get_session(id).await.unwrap();
        assert_eq!(session.state, SessionState::Open);
        assert_eq!(session.pin_code.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_attach_pin_to_missing_session() {
        let registry = registry();
        let missing = Uuid::now_v7();

        let err = registry.attach_pin(missing, "1234").await.unwrap_err();
        assert!(matches!(err, RegistrationError::SessionNotFound(id) if id == missing));
        assert!(registry.repo().is_empty());
    }

    #[tokio::test]
    async fn test_attach_pin_to_completed_session_is_rejected() {
        let registry = registry();
        let id = registry
            .find_or_create_session(42, "alice")
            .await
            .unwrap()
            .session_id();
        registry.attach_pin(id, "1234").await.unwrap();
        registry.complete_session(id).await.unwrap();

        let err = registry.attach_pin(id, "9999").await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidState { state: SessionState::Completed, .. }
        ));

        let session = registry.get_session(id).await.unwrap();
        assert_eq!(session.pin_code.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_complete_twice_is_invalid_state() {
        let registry = registry();
        let id = registry
            .find_or_create_session(1, "a")
            .await
            .unwrap()
            .session_id();

        registry.complete_session(id).await.unwrap();
        let err = registry.complete_session(id).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidState { .. }));
    }
}
