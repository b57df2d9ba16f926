use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Membership level gating which agents a user may open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Guest,
    Standard,
    Premium,
    Other(String),
}

impl From<String> for Tier {
    fn from(value: String) -> Self {
        match value.as_str() {
            "guest" => Tier::Guest,
            "365" => Tier::Standard,
            "3980" => Tier::Premium,
            _ => Tier::Other(value),
        }
    }
}

impl From<Tier> for String {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Guest => "guest".to_string(),
            Tier::Standard => "365".to_string(),
            Tier::Premium => "3980".to_string(),
            Tier::Other(value) => value,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Guest => write!(f, "guest"),
            Tier::Standard => write!(f, "standard (365)"),
            Tier::Premium => write!(f, "premium (3980)"),
            Tier::Other(value) => write!(f, "{}", value),
        }
    }
}

fn default_binded_agents() -> String {
    "[]".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub tier: Tier,
    #[serde(default)]
    pub tier_expire_at: Option<NaiveDateTime>,
    /// JSON-encoded list of custom agent ids bound to this user.
    #[serde(default = "default_binded_agents")]
    pub binded_agents: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl User {
    /// Ids from `binded_agents`; an unparsable value counts as no bindings.
    pub fn bound_agent_ids(&self) -> Vec<i64> {
        serde_json::from_str(&self.binded_agents).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PhoneCredentials<'a> {
    pub phone: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub phone: String,
    pub tier: Tier,
}

/// Fields an administrator may change on a user. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_expire_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binded_agents: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
