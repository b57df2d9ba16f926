use agenthub::models::feedback::{FeedbackKind, NewFeedback};
use agenthub::ApiClient;
use anyhow::Result;
use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    Suggestion,
    Bug,
    Question,
}

impl From<KindArg> for FeedbackKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Suggestion => FeedbackKind::Suggestion,
            KindArg::Bug => FeedbackKind::Bug,
            KindArg::Question => FeedbackKind::Question,
        }
    }
}

pub async fn handle_feedback(
    api: &ApiClient,
    kind: KindArg,
    content: Option<String>,
    contact: Option<String>,
) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => cliclack::input("What would you like to tell us?")
            .multiline()
            .interact()?,
    };

    let ack = api
        .submit_feedback(&NewFeedback {
            kind: kind.into(),
            content,
            contact,
            page_url: Some("cli".to_string()),
        })
        .await?;

    println!(
        "{}",
        style(ack.message.as_deref().unwrap_or("Thanks for the feedback!")).green()
    );
    Ok(())
}
