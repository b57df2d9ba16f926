use std::future::Future;
use std::sync::Arc;

use agenthub::client::chat::StreamingChatClient;
use agenthub::models::agent::Agent;
use agenthub::{ChatError, Transcript, TranscriptError};
use anyhow::Result;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::prompt::{InputType, Prompt};

const INTERRUPTED_TURN: &str = "Interrupted: the reply was discarded.";
const INTERRUPTED_CLEAR: &str = "Interrupted: the conversation was left as it was.";

/// An interactive conversation with one agent.
///
/// While a session runs it owns Ctrl+C: the signal interrupts whatever backend
/// call is in flight instead of ending the process. At the input prompt the
/// line editor reports Ctrl+C itself and the session exits.
pub struct Session<'a> {
    client: StreamingChatClient,
    agent: Agent,
    transcript: Transcript,
    prompt: Box<dyn Prompt + 'a>,
    interrupt: Arc<Notify>,
}

impl<'a> Session<'a> {
    pub fn new(
        client: StreamingChatClient,
        agent: Agent,
        transcript: Transcript,
        prompt: Box<dyn Prompt + 'a>,
    ) -> Self {
        Session {
            client,
            agent,
            transcript,
            prompt,
            interrupt: Arc::new(Notify::new()),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub async fn start(&mut self) -> Result<()> {
        let listener = listen_for_ctrl_c(self.interrupt.clone());
        let result = self.run_loop().await;
        listener.abort();
        self.prompt.close();
        result
    }

    async fn run_loop(&mut self) -> Result<()> {
        self.setup_session();

        loop {
            let quick_prompts = self.quick_prompts();
            let input = self.prompt.get_input(&quick_prompts)?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = input.content {
                        self.process_message(&content).await;
                        // Already on screen; keep it out of the next prompt.
                        self.transcript.dismiss_error();
                    }
                }
                InputType::Clear => self.clear().await,
                InputType::Exit => return Ok(()),
                InputType::AskAgain | InputType::Help => continue,
            }
        }
    }

    /// Sends a single message and returns once the reply has been shown.
    pub async fn headless_start(&mut self, message: &str) -> Result<()> {
        let listener = listen_for_ctrl_c(self.interrupt.clone());
        self.process_message(message).await;
        listener.abort();
        self.prompt.close();
        match self.transcript.last_error() {
            Some(error) => Err(anyhow::anyhow!(error.to_string())),
            None => Ok(()),
        }
    }

    /// Quick prompts are only offered before the first exchange.
    fn quick_prompts(&self) -> Vec<String> {
        if self.transcript.is_empty() {
            self.agent.quick_prompts()
        } else {
            Vec::new()
        }
    }

    fn setup_session(&mut self) {
        for message in self.transcript.messages() {
            self.prompt.render(message);
        }
        let quick_prompts = self.quick_prompts();
        self.prompt.agent_ready(&self.agent, &quick_prompts);
    }

    async fn process_message(&mut self, text: &str) {
        let cancel = CancellationToken::new();
        let interrupt = self.interrupt.clone();

        self.prompt.show_busy();
        let result = {
            let prompt = &mut self.prompt;
            let send = self
                .transcript
                .send(&self.client, self.agent.id, text, &cancel, |message| {
                    prompt.update_busy(message.content.chars().count())
                });
            tokio::pin!(send);
            // Cancelling rather than dropping the turn lets the transcript roll back.
            tokio::select! {
                biased;
                result = &mut send => result,
                _ = interrupt.notified() => {
                    cancel.cancel();
                    send.await
                }
            }
        };
        self.prompt.hide_busy();

        match result {
            Ok(_) => {
                if let Some(reply) = self.transcript.messages().last() {
                    self.prompt.render(reply);
                }
            }
            Err(TranscriptError::Chat(ChatError::Cancelled)) => {
                self.prompt.render_notice(INTERRUPTED_TURN);
            }
            Err(TranscriptError::Chat(err)) if err.is_unauthorized() => {
                self.prompt
                    .render_error("Your session has expired. Run `agenthub login` and try again.");
            }
            Err(err) => self.prompt.render_error(&err.to_string()),
        }
    }

    async fn clear(&mut self) {
        let request = self.client.clear_history(self.agent.id);
        match until_interrupted(request, self.interrupt.notified()).await {
            Some(Ok(())) => {
                self.transcript.clear();
                self.prompt.render_notice("Conversation cleared.");
                let quick_prompts = self.quick_prompts();
                self.prompt.agent_ready(&self.agent, &quick_prompts);
            }
            Some(Err(err)) => self.prompt.render_error(&err.to_string()),
            None => self.prompt.render_notice(INTERRUPTED_CLEAR),
        }
    }
}

/// Forwards every Ctrl+C to `interrupt` until the returned task is aborted.
fn listen_for_ctrl_c(interrupt: Arc<Notify>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupt.notify_waiters();
        }
    })
}

/// Awaits `fut`, giving up with `None` if `interrupted` resolves first.
async fn until_interrupted<T>(
    fut: impl Future<Output = T>,
    interrupted: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        result = fut => Some(result),
        _ = interrupted => None,
    }
}
