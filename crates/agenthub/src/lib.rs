pub mod auth;
pub mod client;
pub mod errors;
pub mod models;
pub mod transcript;

pub use auth::{Credentials, FileTokenStore, TokenStore};
pub use client::{ApiClient, AuthSession, ClientConfig, StreamingChatClient};
pub use errors::{ChatError, ChatResult};
pub use transcript::{Transcript, TranscriptError};
