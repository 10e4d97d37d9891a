//! SQLite identity repository implementation.
//!
//! Implements `IdentityRepository` from `pinbridge-core`. The `UNIQUE`
//! constraint on `identities.chat_id` is what keeps one record per chat:
//! inserts use `ON CONFLICT(chat_id) DO NOTHING` and then read back the
//! owner, inside one writer transaction.

use pinbridge_core::identity::repository::IdentityRepository;
use pinbridge_types::error::RepositoryError;
use pinbridge_types::identity::{IdentityRecord, UserId};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `IdentityRepository`.
#[derive(Clone)]
pub struct SqliteIdentityRepository {
    pool: DatabasePool,
}

impl SqliteIdentityRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain IdentityRecord.
struct IdentityRow {
    user_id: String,
    chat_id: i64,
    display_name: String,
    registered_at: String,
}

impl IdentityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            chat_id: row.try_get("chat_id")?,
            display_name: row.try_get("display_name")?,
            registered_at: row.try_get("registered_at")?,
        })
    }

    fn into_record(self) -> Result<IdentityRecord, RepositoryError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;

        Ok(IdentityRecord {
            user_id: UserId::from_uuid(user_id),
            chat_id: self.chat_id,
            display_name: self.display_name,
            registered_at: parse_datetime(&self.registered_at)?,
        })
    }
}

fn map_row(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<IdentityRecord>, RepositoryError> {
    match row {
        Some(row) => {
            let identity_row =
                IdentityRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(identity_row.into_record()?))
        }
        None => Ok(None),
    }
}

impl IdentityRepository for SqliteIdentityRepository {
    async fn insert_or_get(&self, record: &IdentityRecord) -> Result<IdentityRecord, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO identities (user_id, chat_id, display_name, registered_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(chat_id) DO NOTHING",
        )
        .bind(record.user_id.to_string())
        .bind(record.chat_id)
        .bind(&record.display_name)
        .bind(format_datetime(&record.registered_at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        let row = sqlx::query("SELECT * FROM identities WHERE chat_id = ?")
            .bind(record.chat_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        map_row(row)?.ok_or_else(|| {
            RepositoryError::Query(format!("identity for chat {} missing after insert", record.chat_id))
        })
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<IdentityRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM identities WHERE user_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        map_row(row)
    }

    async fn get_by_chat_id(&self, chat_id: i64) -> Result<Option<IdentityRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM identities WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        map_row(row)
    }
}
