//! IdentityRepository trait definition.

use pinbridge_types::error::RepositoryError;
use pinbridge_types::identity::{IdentityRecord, UserId};

/// Repository trait for identity record persistence.
///
/// Implementations live in pinbridge-infra (e.g., `SqliteIdentityRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait IdentityRepository: Send + Sync {
    /// Insert `record` unless its `chat_id` already owns one, then return the
    /// record that owns the chat.
    ///
    /// Must rely on the store's uniqueness constraint rather than a
    /// read-then-write check, so concurrent callers converge on one record.
    fn insert_or_get(
        &self,
        record: &IdentityRecord,
    ) -> impl std::future::Future<Output = Result<IdentityRecord, RepositoryError>> + Send;

    /// Get a record by its user id.
    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<IdentityRecord>, RepositoryError>> + Send;

    /// Get the record owned by a chat, if any.
    fn get_by_chat_id(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<IdentityRecord>, RepositoryError>> + Send;
}
