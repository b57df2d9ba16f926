use std::future::Future;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::configs::ClientConfig;
use crate::auth::Credentials;
use crate::errors::{ChatError, ChatResult, GENERIC_REQUEST_ERROR};

/// Whether a request needs a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Attach the token when there is one.
    Optional,
    /// Fail with [`ChatError::NotAuthenticated`] before sending when there is none.
    Required,
}

/// Shared HTTP plumbing for every backend endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(config: ClientConfig, credentials: Credentials) -> ChatResult<Self> {
        // No overall timeout: chat responses stream for as long as the agent talks.
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        access: Access,
    ) -> ChatResult<RequestBuilder> {
        let token = match access {
            Access::Required => Some(self.credentials.require()?),
            Access::Optional => self.credentials.token(),
        };

        let url = self.config.url(path);
        debug!(%method, %url, "backend request");

        let builder = self.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends `builder` and decodes a JSON body of type `T`.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ChatResult<T> {
        let body = self
            .within_idle_timeout(async {
                let response = check_status(builder.send().await?).await?;
                Ok(response.bytes().await?)
            })
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends `builder`, ignoring whatever body a success response carries.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ChatResult<()> {
        self.within_idle_timeout(async {
            check_status(builder.send().await?).await?;
            Ok(())
        })
        .await
    }

    /// Non-streaming calls get the whole idle timeout for headers and body together.
    async fn within_idle_timeout<T>(
        &self,
        fut: impl Future<Output = ChatResult<T>>,
    ) -> ChatResult<T> {
        match self.config.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ChatError::Timeout(limit))?,
            None => fut.await,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, access: Access) -> ChatResult<T> {
        let builder = self.request(Method::GET, path, access)?;
        self.send_json(builder).await
    }
}

/// Passes success responses through and turns anything else into a transport error.
pub(crate) async fn check_status(response: Response) -> ChatResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(error_from_response(response).await)
}

async fn error_from_response(response: Response) -> ChatError {
    let status = response.status().as_u16();
    let message = match response.bytes().await {
        Ok(body) => detail_message(&body),
        Err(_) => None,
    };
    ChatError::transport(
        Some(status),
        message.unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string()),
    )
}

/// Pulls a human readable `detail` string out of an error body.
fn detail_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message() {
        assert_eq!(
            detail_message(br#"{"detail": "invalid token"}"#),
            Some("invalid token".to_string())
        );
        assert_eq!(detail_message(br#"{"detail": ""}"#), None);
        // Validation errors carry a list, which is not shown verbatim.
        assert_eq!(detail_message(br#"{"detail": [{"loc": ["body"]}]}"#), None);
        assert_eq!(detail_message(b"<html>502</html>"), None);
    }

    #[test]
    fn test_required_access_without_token_fails_before_sending() {
        let api = ApiClient::new(ClientConfig::default(), Credentials::anonymous()).unwrap();
        let result = api.request(Method::GET, "auth/me", Access::Required);
        assert!(matches!(result, Err(ChatError::NotAuthenticated)));
        assert!(api.request(Method::GET, "agents", Access::Optional).is_ok());
    }
}
