//! Inbound chat events and their reconciliation outcomes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::UserId;

/// One message delivered by the chat transport, in arrival order.
///
/// Delivery is at-least-once, so the same event may be seen twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub display_name: String,
    pub text: String,
}

impl InboundEvent {
    pub fn new(chat_id: i64, display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            display_name: display_name.into(),
            text: text.into(),
        }
    }
}

/// What handling a single inbound event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// First contact: a new open session was created, payload ignored.
    SessionOpened { session_id: Uuid },
    /// Pin-bearing contact with a blank payload; the session stays open.
    Ignored { session_id: Uuid },
    /// Pin attached, identity persisted, session completed.
    Registered { session_id: Uuid, user_id: UserId },
}
