use reqwest::Method;

use super::catalog::Acknowledgement;
use super::chat::AgentId;
use super::http::{Access, ApiClient};
use crate::errors::ChatResult;
use crate::models::agent::{AgentAdmin, AgentCreate, AgentUpdate};
use crate::models::feedback::{Feedback, FeedbackStatus, FeedbackStatusUpdate};
use crate::models::user::{User, UserUpdate};

/// Admin panel endpoints. Every call needs an administrator's token.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { api: self }
    }
}

impl AdminApi<'_> {
    pub async fn list_agents(&self) -> ChatResult<Vec<AgentAdmin>> {
        self.api.get("admin/agents", Access::Required).await
    }

    pub async fn create_agent(&self, agent: &AgentCreate) -> ChatResult<AgentAdmin> {
        let request = self
            .api
            .request(Method::POST, "admin/agents", Access::Required)?
            .json(agent);
        self.api.send_json(request).await
    }

    pub async fn update_agent(&self, agent_id: AgentId, update: &AgentUpdate) -> ChatResult<AgentAdmin> {
        let request = self
            .api
            .request(Method::PUT, &format!("admin/agents/{}", agent_id), Access::Required)?
            .json(update);
        self.api.send_json(request).await
    }

    pub async fn delete_agent(&self, agent_id: AgentId) -> ChatResult<()> {
        let request = self.api.request(
            Method::DELETE,
            &format!("admin/agents/{}", agent_id),
            Access::Required,
        )?;
        self.api.send_empty(request).await
    }

    pub async fn list_users(&self) -> ChatResult<Vec<User>> {
        self.api.get("admin/users", Access::Required).await
    }

    pub async fn update_user(&self, user_id: i64, update: &UserUpdate) -> ChatResult<User> {
        let request = self
            .api
            .request(Method::PUT, &format!("admin/users/{}", user_id), Access::Required)?
            .json(update);
        self.api.send_json(request).await
    }

    /// Newest first, optionally restricted to one status.
    pub async fn list_feedback(&self, status: Option<FeedbackStatus>) -> ChatResult<Vec<Feedback>> {
        let mut request = self
            .api
            .request(Method::GET, "admin/feedbacks", Access::Required)?;
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.api.send_json(request).await
    }

    pub async fn set_feedback_status(
        &self,
        feedback_id: i64,
        status: FeedbackStatus,
    ) -> ChatResult<Acknowledgement> {
        let request = self
            .api
            .request(
                Method::PUT,
                &format!("admin/feedbacks/{}", feedback_id),
                Access::Required,
            )?
            .json(&FeedbackStatusUpdate { status });
        self.api.send_json(request).await
    }
}
