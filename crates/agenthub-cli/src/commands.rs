pub mod admin;
pub mod agents;
pub mod auth;
pub mod chat;
pub mod feedback;
