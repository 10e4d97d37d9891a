//! Test doubles shared by the core unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use pinbridge_types::error::RepositoryError;
use pinbridge_types::identity::{IdentityRecord, UserId};

use crate::identity::repository::IdentityRepository;

/// Identity repository keyed by chat id; the entry lock plays the role of the
/// unique constraint.
#[derive(Default)]
pub struct MemoryIdentityRepository {
    by_chat: DashMap<i64, IdentityRecord>,
    offline: AtomicBool,
}

impl MemoryIdentityRepository {
    pub fn len(&self) -> usize {
        self.by_chat.len()
    }

    /// Make every subsequent call fail with a connection error.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl IdentityRepository for MemoryIdentityRepository {
    async fn insert_or_get(&self, record: &IdentityRecord) -> Result<IdentityRecord, RepositoryError> {
        self.check()?;
        Ok(self
            .by_chat
            .entry(record.chat_id)
            .or_insert_with(|| record.clone())
            .clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<IdentityRecord>, RepositoryError> {
        self.check()?;
        Ok(self
            .by_chat
            .iter()
            .find(|entry| entry.value().user_id == *id)
            .map(|entry| entry.value().clone()))
    }

    async fn get_by_chat_id(&self, chat_id: i64) -> Result<Option<IdentityRecord>, RepositoryError> {
        self.check()?;
        Ok(self.by_chat.get(&chat_id).map(|entry| entry.value().clone()))
    }
}

/// Identity repository that must never be reached.
pub struct UnreachableIdentityRepository;

impl IdentityRepository for UnreachableIdentityRepository {
    async fn insert_or_get(&self, _record: &IdentityRecord) -> Result<IdentityRecord, RepositoryError> {
        panic!("store reached: insert_or_get");
    }

    async fn get_by_id(&self, _id: &UserId) -> Result<Option<IdentityRecord>, RepositoryError> {
        panic!("store reached: get_by_id");
    }

    async fn get_by_chat_id(&self, _chat_id: i64) -> Result<Option<IdentityRecord>, RepositoryError> {
        panic!("store reached: get_by_chat_id");
    }
}
