use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Feedback category; the backend stores any string, so unknown values are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackKind {
    #[default]
    Suggestion,
    Bug,
    Question,
    Other(String),
}

impl From<String> for FeedbackKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "suggestion" => FeedbackKind::Suggestion,
            "bug" => FeedbackKind::Bug,
            "question" => FeedbackKind::Question,
            _ => FeedbackKind::Other(value),
        }
    }
}

impl From<FeedbackKind> for String {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Other(value) => value,
            known => known.to_string(),
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackKind::Suggestion => f.write_str("suggestion"),
            FeedbackKind::Bug => f.write_str("bug"),
            FeedbackKind::Question => f.write_str("question"),
            FeedbackKind::Other(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Read,
    Resolved,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Read => "read",
            FeedbackStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(FeedbackStatus::Pending),
            "read" => Ok(FeedbackStatus::Read),
            "resolved" => Ok(FeedbackStatus::Resolved),
            other => Err(format!("invalid feedback status: {}", other)),
        }
    }
}

/// Feedback submitted by a logged-in user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewFeedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feedback {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub content: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
    pub status: FeedbackStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackStatusUpdate {
    pub status: FeedbackStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_feedback_wire_format() {
        let feedback = NewFeedback {
            kind: FeedbackKind::Bug,
            content: "send button stays disabled".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&feedback).unwrap(),
            json!({"type": "bug", "content": "send button stays disabled"})
        );
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let item: Feedback = serde_json::from_value(json!({
            "id": 9,
            "type": "praise",
            "content": "love it",
            "status": "read",
            "created_at": "2024-06-02T09:00:00"
        }))
        .unwrap();
        assert_eq!(item.kind, FeedbackKind::Other("praise".to_string()));
        assert_eq!(item.kind.to_string(), "praise");
        assert_eq!(
            serde_json::to_value(&item.kind).unwrap(),
            json!("praise")
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Resolved".parse::<FeedbackStatus>(), Ok(FeedbackStatus::Resolved));
        assert!("done".parse::<FeedbackStatus>().is_err());
    }
}
