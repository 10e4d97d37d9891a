//! Registration session types.
//!
//! A session tracks one chat's registration attempt from first contact to
//! pin submission. Sessions are identified by plain UUIDs, separate from
//! [`UserId`](crate::identity::UserId).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a registration session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (state IN ('open', 'completed'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Contact registered, pin not yet reconciled.
    #[default]
    Open,
    /// Pin supplied and an identity record exists for the chat.
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Open => write!(f, "open"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(SessionState::Open),
            "completed" => Ok(SessionState::Completed),
            other => Err(format!("invalid session state: '{other}'")),
        }
    }
}

/// A registration session for one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub chat_id: i64,
    /// Captured from the first contact; never overwritten.
    pub display_name: String,
    /// `None` until a pin-bearing event arrives.
    pub pin_code: Option<String>,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Build a fresh open session with a newly generated id.
    pub fn open(chat_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            chat_id,
            display_name: display_name.into(),
            pin_code: None,
            state: SessionState::Open,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }
}
