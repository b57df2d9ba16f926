use agenthub::models::agent::Agent;
use agenthub::{ApiClient, StreamingChatClient, Transcript};
use anyhow::{bail, Result};
use console::style;

use super::agents::resolve_agent;
use crate::prompt::rustyline::RustylinePrompt;
use crate::prompt::{Prompt, Theme};
use crate::session::Session;

async fn open_agent(api: &ApiClient, query: &str) -> Result<Agent> {
    if !api.credentials().is_authenticated() {
        bail!("Not logged in. Run `agenthub login` first.");
    }
    let agent = resolve_agent(api, query).await?;
    if !agent.can_access {
        bail!(
            "{} is not included in your membership ({} required)",
            agent.name,
            agent.tier_required
        );
    }
    Ok(agent)
}

pub async fn handle_chat(
    api: &ApiClient,
    query: &str,
    message: Option<String>,
    theme: Theme,
) -> Result<()> {
    let agent = open_agent(api, query).await?;
    let client = StreamingChatClient::new(api.clone());
    let prompt = RustylinePrompt::new(theme)?;

    match message {
        Some(message) => {
            // One-shot: no history replay, just the reply.
            let mut session = Session::new(client, agent, Transcript::new(), Box::new(prompt));
            session.headless_start(&message).await
        }
        None => {
            let history = client.history(agent.id).await?;
            let mut session = Session::new(
                client,
                agent,
                Transcript::from_history(history),
                Box::new(prompt),
            );
            session.start().await
        }
    }
}

pub async fn handle_history(api: &ApiClient, query: &str, theme: Theme) -> Result<()> {
    let agent = open_agent(api, query).await?;
    let client = StreamingChatClient::new(api.clone());
    let history = client.history(agent.id).await?;

    if history.is_empty() {
        println!("No conversation with {} yet.", agent.name);
        return Ok(());
    }

    let mut prompt = RustylinePrompt::new(theme)?;
    for message in &history {
        if let Some(created_at) = message.created_at {
            println!("{}", style(created_at.format("%Y-%m-%d %H:%M")).dim());
        }
        prompt.render(message);
    }
    Ok(())
}

pub async fn handle_clear(api: &ApiClient, query: &str) -> Result<()> {
    let agent = open_agent(api, query).await?;
    let confirmed = cliclack::confirm(format!(
        "Delete your whole conversation with {}?",
        agent.name
    ))
    .initial_value(false)
    .interact()?;
    if !confirmed {
        return Ok(());
    }

    StreamingChatClient::new(api.clone())
        .clear_history(agent.id)
        .await?;
    println!("Conversation with {} cleared.", agent.name);
    Ok(())
}
