use std::sync::Arc;

use agenthub::{ApiClient, AuthSession, Credentials};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;
mod prompt;
mod render;
mod session;

use commands::admin::{handle_admin, AdminCommand};
use commands::agents::handle_agents;
use commands::auth::{handle_login, handle_logout, handle_register, handle_whoami};
use commands::chat::{handle_chat, handle_clear, handle_history};
use commands::feedback::{handle_feedback, KindArg};
use configuration::Settings;
use prompt::Theme;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend API root (can also be set via AGENTHUB_API__BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with your phone number and password
    Login {
        #[arg(long)]
        phone: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        phone: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show your profile and usage
    Whoami,

    /// List the agents in the catalog
    Agents,

    /// Chat with an agent, by id or name
    Chat {
        agent: String,

        /// Send one message, print the reply and exit
        #[arg(short, long)]
        message: Option<String>,

        #[arg(long, value_enum, default_value_t = Theme::Dark)]
        theme: Theme,
    },

    /// Print the conversation with an agent
    History {
        agent: String,

        #[arg(long, value_enum, default_value_t = Theme::Dark)]
        theme: Theme,
    },

    /// Delete the conversation with an agent
    Clear { agent: String },

    /// Send feedback to the AgentHub team
    Feedback {
        #[arg(long, value_enum, default_value_t = KindArg::Suggestion)]
        kind: KindArg,

        #[arg(long)]
        contact: Option<String>,

        content: Option<String>,
    },

    /// Administration (admin accounts only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env("AGENTHUB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_api(cli: &Cli) -> Result<ApiClient> {
    let settings = Settings::new().context("failed to load configuration")?;
    let mut config = settings.client_config();
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    let store = settings.token_store()?;
    tracing::debug!(path = %store.path().display(), "using token store");
    let credentials = Credentials::load(Arc::new(store))?;
    Ok(ApiClient::new(config, credentials)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let api = build_api(&cli)?;

    match cli.command {
        Command::Login { phone } => handle_login(&mut AuthSession::new(api), phone).await,
        Command::Register { phone } => handle_register(&mut AuthSession::new(api), phone).await,
        Command::Logout => handle_logout(&mut AuthSession::new(api)),
        Command::Whoami => handle_whoami(&mut AuthSession::new(api)).await,
        Command::Agents => handle_agents(&api).await,
        Command::Chat {
            agent,
            message,
            theme,
        } => handle_chat(&api, &agent, message, theme).await,
        Command::History { agent, theme } => handle_history(&api, &agent, theme).await,
        Command::Clear { agent } => handle_clear(&api, &agent).await,
        Command::Feedback {
            kind,
            contact,
            content,
        } => handle_feedback(&api, kind, content, contact).await,
        Command::Admin { command } => {
            let mut session = AuthSession::new(api);
            if session.restore().await?.is_none() {
                anyhow::bail!("Not logged in. Run `agenthub login` first.");
            }
            if !session.is_admin() {
                anyhow::bail!("This account is not an administrator.");
            }
            handle_admin(session.api(), command).await
        }
    }
}
