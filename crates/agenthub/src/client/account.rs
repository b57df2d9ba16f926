use reqwest::Method;
use tracing::{info, warn};

use super::http::{Access, ApiClient};
use crate::errors::ChatResult;
use crate::models::user::{PhoneCredentials, RegisterResponse, TokenResponse, User};

impl ApiClient {
    /// Exchanges phone and password for a token and stores it in the client's credentials.
    pub async fn login(&self, phone: &str, password: &str) -> ChatResult<TokenResponse> {
        let request = self
            .request(Method::POST, "auth/login", Access::Optional)?
            .json(&PhoneCredentials { phone, password });
        let response: TokenResponse = self.send_json(request).await?;
        self.credentials().set(response.access_token.clone())?;
        info!(user_id = response.user.id, "logged in");
        Ok(response)
    }

    pub async fn register(&self, phone: &str, password: &str) -> ChatResult<RegisterResponse> {
        let request = self
            .request(Method::POST, "auth/register", Access::Optional)?
            .json(&PhoneCredentials { phone, password });
        self.send_json(request).await
    }

    pub async fn me(&self) -> ChatResult<User> {
        self.get("auth/me", Access::Required).await
    }
}

/// The logged-in user, kept in step with the client's credentials.
pub struct AuthSession {
    api: ApiClient,
    user: Option<User>,
}

impl AuthSession {
    pub fn new(api: ApiClient) -> Self {
        Self { api, user: None }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_admin)
    }

    /// Resolves the stored token into a user. A token the backend rejects is
    /// dropped so the next run starts logged out.
    pub async fn restore(&mut self) -> ChatResult<Option<&User>> {
        if !self.api.credentials().is_authenticated() {
            self.user = None;
            return Ok(None);
        }
        match self.api.me().await {
            Ok(user) => {
                self.user = Some(user);
                Ok(self.user.as_ref())
            }
            Err(err) => {
                warn!("stored token rejected: {}", err);
                self.api.credentials().invalidate()?;
                self.user = None;
                Ok(None)
            }
        }
    }

    pub async fn login(&mut self, phone: &str, password: &str) -> ChatResult<&User> {
        let response = self.api.login(phone, password).await?;
        Ok(&*self.user.insert(response.user))
    }

    /// Creates the account, then logs straight in with the same credentials.
    pub async fn register(&mut self, phone: &str, password: &str) -> ChatResult<&User> {
        self.api.register(phone, password).await?;
        self.login(phone, password).await
    }

    pub fn logout(&mut self) -> ChatResult<()> {
        self.user = None;
        self.api.credentials().invalidate()?;
        info!("logged out");
        Ok(())
    }

    /// Re-fetches the profile; any failure logs the user out.
    pub async fn refresh_user(&mut self) -> ChatResult<Option<&User>> {
        match self.api.me().await {
            Ok(user) => Ok(Some(&*self.user.insert(user))),
            Err(err) => {
                warn!("profile refresh failed, logging out: {}", err);
                self.logout()?;
                Ok(None)
            }
        }
    }
}
