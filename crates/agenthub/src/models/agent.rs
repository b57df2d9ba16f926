use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Upper bound on the quick prompts offered for one agent.
pub const MAX_QUICK_PROMPTS: usize = 5;

/// Prompts offered when an agent has none configured.
pub const DEFAULT_QUICK_PROMPTS: [&str; 2] = [
    "What can you help me with?",
    "Show me an example of how to use you",
];

fn default_icon() -> String {
    "🤖".to_string()
}

fn default_category() -> String {
    "general".to_string()
}

/// An agent as listed in the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tier_required: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub can_access: bool,
    /// JSON-encoded array of prompt strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub quick_prompts: String,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Greeting text shown above an empty conversation.
    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.trim().is_empty() => description,
            _ => "How can I help you?",
        }
    }

    /// Parsed quick prompts, at most [`MAX_QUICK_PROMPTS`], or the defaults when
    /// the stored value is missing, malformed or empty.
    pub fn quick_prompts(&self) -> Vec<String> {
        let parsed = serde_json::from_str::<Vec<serde_json::Value>>(&self.quick_prompts)
            .unwrap_or_default();
        let prompts: Vec<String> = parsed
            .into_iter()
            .filter_map(|value| value.as_str().map(|s| s.trim().to_string()))
            .filter(|prompt| !prompt.is_empty())
            .take(MAX_QUICK_PROMPTS)
            .collect();

        if prompts.is_empty() {
            DEFAULT_QUICK_PROMPTS.iter().map(|s| s.to_string()).collect()
        } else {
            prompts
        }
    }
}

/// An agent as seen from the admin panel, upstream endpoint details included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAdmin {
    pub id: i64,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub api_endpoint: String,
    pub api_token: String,
    pub project_id: String,
    pub tier_required: String,
    pub status: String,
    pub sort_order: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentCreate {
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    pub category: String,
    pub api_endpoint: String,
    pub api_token: String,
    pub project_id: String,
    pub tier_required: String,
    pub status: String,
    pub sort_order: i64,
}

impl AgentCreate {
    pub fn new<S: Into<String>>(
        name: S,
        api_endpoint: S,
        api_token: S,
        project_id: S,
    ) -> Self {
        AgentCreate {
            name: name.into(),
            icon: default_icon(),
            description: None,
            category: default_category(),
            api_endpoint: api_endpoint.into(),
            api_token: api_token.into(),
            project_id: project_id.into(),
            tier_required: "365".to_string(),
            status: "active".to_string(),
            sort_order: 0,
        }
    }
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

impl AgentUpdate {
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_object().map(|map| map.is_empty()))
            .unwrap_or(true)
    }
}
