//! Durable user identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered user, wrapping a UUID v7 (time-sortable).
///
/// Kept distinct from session ids so the two identifier spaces cannot be
/// mixed up at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A persisted user identity, created once per chat and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: UserId,
    /// Originating chat; unique across all records.
    pub chat_id: i64,
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Public view of an identity record, as returned by the query path.
///
/// Field names follow the wire format consumed by HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    #[serde(rename = "chatID")]
    pub chat_id: i64,
    pub name: String,
    #[serde(rename = "registeredAt")]
    pub registered_at: DateTime<Utc>,
}

impl From<IdentityRecord> for UserView {
    fn from(record: IdentityRecord) -> Self {
        Self {
            id: record.user_id,
            chat_id: record.chat_id,
            name: record.display_name,
            registered_at: record.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parse() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_user_view_wire_names() {
        let record = IdentityRecord {
            user_id: UserId::new(),
            chat_id: 42,
            display_name: "alice".to_string(),
            registered_at: Utc::now(),
        };
        let json = serde_json::to_value(UserView::from(record.clone())).unwrap();
        assert_eq!(json["id"], record.user_id.to_string());
        assert_eq!(json["chatID"], 42);
        assert_eq!(json["name"], "alice");
        assert!(json["registeredAt"].is_string());
    }
}
