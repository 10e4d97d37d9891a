//! Identity store service.
//!
//! Creates identity records exactly once per chat and fetches them by id.

use chrono::Utc;
use pinbridge_types::error::RegistrationError;
use pinbridge_types::identity::{IdentityRecord, UserId};
use tracing::{debug, info};

use crate::identity::repository::IdentityRepository;

/// Service over an [`IdentityRepository`].
///
/// Generic over the repository to maintain clean architecture
/// (pinbridge-core never depends on pinbridge-infra).
pub struct IdentityStore<I: IdentityRepository> {
    repo: I,
}

impl<I: IdentityRepository> IdentityStore<I> {
    pub fn new(repo: I) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &I {
        &self.repo
    }

    /// Persist an identity for `chat_id`, returning its user id.
    ///
    /// Idempotent per chat: if the chat already owns a record, the existing
    /// user id is returned and nothing is written.
    pub async fn persist(
        &self,
        chat_id: i64,
        display_name: &str,
    ) -> Result<UserId, RegistrationError> {
        let candidate = IdentityRecord {
            user_id: UserId::new(),
            chat_id,
            display_name: display_name.to_string(),
            registered_at: Utc::now(),
        };

        let stored = self.repo.insert_or_get(&candidate).await?;

        if stored.user_id == candidate.user_id {
            info!(chat_id, user_id = %stored.user_id, "Identity registered");
        } else {
            debug!(chat_id, user_id = %stored.user_id, "Chat already registered, reusing identity");
        }

        Ok(stored.user_id)
    }

    /// Fetch a record by user id.
    pub async fn fetch(&self, user_id: &UserId) -> Result<IdentityRecord, RegistrationError> {
        self.repo
            .get_by_id(user_id)
            .await?
            .ok_or(RegistrationError::UserNotFound(user_id.0))
    }

    /// Fetch the record owned by a chat, if any.
    pub async fn find_by_chat(
        &self,
        chat_id: i64,
    ) -> Result<Option<IdentityRecord>, RegistrationError> {
        Ok(self.repo.get_by_chat_id(chat_id).await?)
    }
}
