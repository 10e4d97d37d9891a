//! Telegram Bot API wire types (the subset the poller reads).

use pinbridge_types::event::InboundEvent;
use serde::Deserialize;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

impl Update {
    /// Map a message update to an inbound event.
    ///
    /// Non-message updates yield `None`. The display name is the sender's
    /// username, falling back to their first name.
    pub fn into_event(self) -> Option<InboundEvent> {
        let message = self.message?;
        let display_name = message
            .from
            .map(|user| user.username.unwrap_or(user.first_name))
            .unwrap_or_default();

        Some(InboundEvent {
            chat_id: message.chat.id,
            display_name,
            text: message.text.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_updates_response() {
        let json = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"},
                 "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
                 "text": "/start"}},
                {"update_id": 11, "edited_message": {"message_id": 1}}
            ]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 2);

        let mut events = updates.into_iter().map(Update::into_event);
        assert_eq!(
            events.next().unwrap(),
            Some(InboundEvent::new(42, "alice", "/start"))
        );
        assert_eq!(events.next().unwrap(), None);
    }

    #[test]
    fn test_display_name_falls_back_to_first_name() {
        let json = r#"{"update_id": 1, "message": {"chat": {"id": 7},
            "from": {"first_name": "Bob"}}}"#;
        let update: Update = serde_json::from_str(json).unwrap();

        let event = update.into_event().unwrap();
        assert_eq!(event.display_name, "Bob");
        assert_eq!(event.text, "");
    }

    #[test]
    fn test_error_response() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
