//! In-memory session backend.
//!
//! Sessions are grouped per chat in a `DashMap`, so every mutation for a chat
//! runs under that chat's shard lock. A second map indexes session ids to
//! their chat. Lock order is always `chats` then `index`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pinbridge_types::error::RepositoryError;
use pinbridge_types::session::{ChatSession, SessionState};
use uuid::Uuid;

use crate::session::repository::SessionRepository;

/// `DashMap`-backed [`SessionRepository`]. Contents are lost on restart.
#[derive(Default)]
pub struct InMemorySessionRepository {
    chats: DashMap<i64, Vec<ChatSession>>,
    index: DashMap<Uuid, i64>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of sessions ever created.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn chat_of(&self, session_id: &Uuid) -> Option<i64> {
        self.index.get(session_id).map(|entry| *entry.value())
    }

    /// Apply `f` to the open session with `session_id`, under its chat's lock.
    fn with_open_session(
        &self,
        session_id: &Uuid,
        f: impl FnOnce(&mut ChatSession),
    ) -> Result<(), RepositoryError> {
        let chat_id = self.chat_of(session_id).ok_or(RepositoryError::NotFound)?;
        let mut sessions = self.chats.get_mut(&chat_id).ok_or(RepositoryError::NotFound)?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == *session_id && s.state == SessionState::Open)
            .ok_or(RepositoryError::NotFound)?;
        f(session);
        Ok(())
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn find_or_create_open(
        &self,
        candidate: &ChatSession,
    ) -> Result<(ChatSession, bool), RepositoryError> {
        let mut sessions = self.chats.entry(candidate.chat_id).or_default();

        if let Some(open) = sessions.iter().find(|s| s.state == SessionState::Open) {
            return Ok((open.clone(), false));
        }

        sessions.push(candidate.clone());
        self.index.insert(candidate.id, candidate.chat_id);
        Ok((candidate.clone(), true))
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let Some(chat_id) = self.chat_of(session_id) else {
            return Ok(None);
        };
        Ok(self
            .chats
            .get(&chat_id)
            .and_then(|sessions| sessions.iter().find(|s| s.id == *session_id).cloned()))
    }

    async fn set_pin(&self, session_id: &Uuid, pin: &str) -> Result<(), RepositoryError> {
        self.with_open_session(session_id, |session| {
            session.pin_code = Some(pin.to_string());
        })
    }

    async fn mark_completed(
        &self,
        session_id: &Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.with_open_session(session_id, |session| {
            session.state = SessionState::Completed;
            session.completed_at = Some(completed_at);
        })
    }

    async fn list_pending(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut pending: Vec<ChatSession> = self
            .chats
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|s| s.state == SessionState::Open && s.pin_code.is_some())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        pending.sort_by_key(|s| s.created_at);
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_find_or_create_reuses_open_session() {
        let repo = InMemorySessionRepository::new();

        let (first, created) = repo
            .find_or_create_open(&ChatSession::open(42, "alice"))
            .await
            .unwrap();
        assert!(created);

        let (second, created) = repo
            .find_or_create_open(&ChatSession::open(42, "bob"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.display_name, "alice");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_contact_creates_one_session() {
        let repo = Arc::new(InMemorySessionRepository::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.find_or_create_open(&ChatSession::open(9, "racer"))
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        let mut ids = Vec::new();
        for handle in handles {
            let (session, was_created) = handle.await.unwrap();
            if was_created {
                created += 1;
            }
            ids.push(session.id);
        }

        assert_eq!(created, 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_completed_session_frees_the_chat() {
        let repo = InMemorySessionRepository::new();
        let (first, _) = repo
            .find_or_create_open(&ChatSession::open(42, "alice"))
            .await
            .unwrap();

        repo.mark_completed(&first.id, Utc::now()).await.unwrap();

        let (second, created) = repo
            .find_or_create_open(&ChatSession::open(42, "alice2"))
            .await
            .unwrap();
        assert!(created);
        assert_ne!(second.id, first.id);

        let stored = repo.get_session(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.state, SessionState::Completed);
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_set_pin_requires_open_session() {
        let repo = InMemorySessionRepository::new();
        let (session, _) = repo
            .find_or_create_open(&ChatSession::open(1, "a"))
            .await
            .unwrap();

        repo.set_pin(&session.id, "1234").await.unwrap();
        repo.mark_completed(&session.id, Utc::now()).await.unwrap();

        let err = repo.set_pin(&session.id, "9999").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let err = repo.set_pin(&Uuid::now_v7(), "9999").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let stored = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.pin_code.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_list_pending_only_open_with_pin() {
        let repo = InMemorySessionRepository::new();
        let (with_pin, _) = repo
            .find_or_create_open(&ChatSession::open(1, "a"))
            .await
            .unwrap();
        repo.find_or_create_open(&ChatSession::open(2, "b"))
            .await
            .unwrap();
        repo.set_pin(&with_pin.id, "0000").await.unwrap();

        let pending = repo.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, with_pin.id);
    }
}
