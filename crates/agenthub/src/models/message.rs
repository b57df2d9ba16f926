use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a conversation with an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl ChatMessage {
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        ChatMessage {
            role,
            content: content.into(),
            id: None,
            created_at: None,
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Body of `GET /agents/{id}/history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatHistory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_entry_deserialization() {
        let history: ChatHistory = serde_json::from_value(json!({
            "messages": [
                {"id": 1, "role": "user", "content": "hello", "created_at": "2024-05-01T10:00:00"},
                {"id": 2, "role": "assistant", "content": null, "created_at": "2024-05-01T10:00:03.120000"}
            ]
        }))
        .unwrap();

        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[0].role, Role::User);
        assert_eq!(history.messages[0].content, "hello");
        assert_eq!(history.messages[1].content, "");
        assert!(history.messages[1].created_at.is_some());
    }

    #[test]
    fn test_missing_messages_is_empty_history() {
        let history: ChatHistory = serde_json::from_value(json!({})).unwrap();
        assert!(history.messages.is_empty());
    }

    #[test]
    fn test_serialization_skips_unset_fields() {
        let value = serde_json::to_value(ChatMessage::assistant("Hi")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "Hi"}));
    }
}
