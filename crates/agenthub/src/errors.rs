use std::time::Duration;

use thiserror::Error;

/// Fallback text shown when the backend gives no usable error detail.
pub const GENERIC_REQUEST_ERROR: &str = "request failed";

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    /// HTTP-level failure: a non-2xx response or a network error.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The server sent an explicit error frame mid-stream.
    #[error("{0}")]
    Stream(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("no data received for {0:?}")]
    Timeout(Duration),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("credential storage error: {0}")]
    Storage(String),
}

impl ChatError {
    pub fn transport<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        ChatError::Transport {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a transport failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// True for 401 responses and missing credentials, i.e. the caller should log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ChatError::NotAuthenticated) || self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ChatError::Decode(err.to_string());
        }
        ChatError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_displays_backend_message_verbatim() {
        let err = ChatError::transport(Some(401), "invalid token");
        assert_eq!(err.to_string(), "invalid token");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_stream_error_is_not_unauthorized() {
        let err = ChatError::Stream("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
        assert!(ChatError::NotAuthenticated.is_unauthorized());
    }
}
