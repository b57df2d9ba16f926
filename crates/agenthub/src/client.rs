pub mod account;
pub mod admin;
pub mod catalog;
pub mod chat;
pub mod configs;
pub mod http;
pub mod sse;

pub use account::AuthSession;
pub use admin::AdminApi;
pub use chat::StreamingChatClient;
pub use configs::ClientConfig;
pub use http::ApiClient;
