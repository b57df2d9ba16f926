use reqwest::Method;
use serde::Deserialize;

use super::chat::AgentId;
use super::http::{Access, ApiClient};
use crate::errors::{ChatError, ChatResult};
use crate::models::agent::Agent;
use crate::models::feedback::NewFeedback;
use crate::models::stats::UserStats;

/// Confirmation body some endpoints return, e.g. `{"message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    /// Catalog in display order; `can_access` reflects the current user.
    pub async fn list_agents(&self) -> ChatResult<Vec<Agent>> {
        self.get("agents", Access::Optional).await
    }

    pub async fn agent(&self, agent_id: AgentId) -> ChatResult<Agent> {
        self.get(&format!("agents/{}", agent_id), Access::Optional)
            .await
    }

    pub async fn submit_feedback(&self, feedback: &NewFeedback) -> ChatResult<Acknowledgement> {
        let content = feedback.content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let body = NewFeedback {
            content: content.to_string(),
            ..feedback.clone()
        };
        let request = self
            .request(Method::POST, "feedback", Access::Required)?
            .json(&body);
        self.send_json(request).await
    }

    pub async fn user_stats(&self) -> ChatResult<UserStats> {
        self.get("stats/user", Access::Required).await
    }
}
