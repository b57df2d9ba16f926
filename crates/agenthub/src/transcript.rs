use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::client::chat::{AgentId, StreamingChatClient};
use crate::errors::ChatError;
use crate::models::message::{ChatMessage, Role};

/// Shown when a failed turn carries no message of its own.
pub const GENERIC_SEND_ERROR: &str = "send failed";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscriptError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("a reply is still streaming")]
    TurnInProgress,

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Conversation with one agent as shown to the user.
///
/// A turn appends the user message and an empty assistant placeholder up
/// front; snapshots then replace the placeholder's content, and a failure
/// removes it again while keeping the user message.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    pending: bool,
    error: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Forgets the last failure once it has been shown.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Starts a turn and returns the trimmed text to send.
    pub fn begin_turn(&mut self, text: &str) -> Result<String, TranscriptError> {
        if self.pending {
            return Err(TranscriptError::TurnInProgress);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(TranscriptError::EmptyMessage);
        }

        self.error = None;
        self.messages.push(ChatMessage::user(text));
        self.messages.push(ChatMessage::assistant(""));
        self.pending = true;
        Ok(text.to_string())
    }

    /// Replaces the reply being streamed with `snapshot`.
    pub fn apply_snapshot(&mut self, snapshot: &str) {
        if !self.pending {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            *last = ChatMessage::assistant(snapshot);
        }
    }

    pub fn complete_turn(&mut self, final_text: &str) {
        self.apply_snapshot(final_text);
        self.pending = false;
    }

    /// Rolls back the placeholder and records the error for display.
    pub fn fail_turn(&mut self, error: &ChatError) {
        if self.pending
            && self
                .messages
                .last()
                .is_some_and(|message| message.role == Role::Assistant)
        {
            self.messages.pop();
        }
        self.pending = false;

        let text = error.to_string();
        self.error = Some(if text.trim().is_empty() {
            GENERIC_SEND_ERROR.to_string()
        } else {
            text
        });
    }

    /// Empties the conversation; call after the backend history was deleted.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.pending = false;
        self.error = None;
    }

    /// Runs one full turn against `client`, calling `on_update` with the
    /// assistant message after every snapshot.
    pub async fn send<F>(
        &mut self,
        client: &StreamingChatClient,
        agent_id: AgentId,
        text: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<String, TranscriptError>
    where
        F: FnMut(&ChatMessage),
    {
        let message = self.begin_turn(text)?;

        let result = client
            .send_with_cancel(agent_id, &message, cancel, |snapshot| {
                self.apply_snapshot(snapshot);
                if let Some(last) = self.messages.last() {
                    on_update(last);
                }
            })
            .await;

        match result {
            Ok(reply) => {
                self.complete_turn(&reply);
                Ok(reply)
            }
            Err(err) => {
                self.fail_turn(&err);
                Err(err.into())
            }
        }
    }
}
