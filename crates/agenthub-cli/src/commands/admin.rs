use agenthub::models::agent::{AgentCreate, AgentUpdate};
use agenthub::models::feedback::{Feedback, FeedbackStatus};
use agenthub::models::user::{Tier, UserUpdate};
use agenthub::ApiClient;
use anyhow::{bail, Result};
use clap::Subcommand;
use console::style;

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List every agent, upstream endpoint included
    Agents,

    /// Create an agent interactively
    CreateAgent,

    /// Enable or disable an agent
    AgentStatus {
        id: i64,
        #[arg(value_parser = ["active", "inactive"])]
        status: String,
    },

    /// Delete an agent
    DeleteAgent { id: i64 },

    /// List users
    Users,

    /// Change a user's membership tier (guest, 365 or 3980)
    SetTier { user_id: i64, tier: String },

    /// Enable or disable a user account
    UserActive {
        user_id: i64,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },

    /// List feedback, optionally only with one status
    Feedback {
        #[arg(long)]
        status: Option<FeedbackStatus>,
    },

    /// Mark feedback as read or resolved
    FeedbackStatus { id: i64, status: FeedbackStatus },
}

pub async fn handle_admin(api: &ApiClient, command: AdminCommand) -> Result<()> {
    let admin = api.admin();
    match command {
        AdminCommand::Agents => {
            for agent in admin.list_agents().await? {
                println!(
                    "{:>3}  {} {:<24} {:<8} tier {:<6} {}",
                    agent.id,
                    agent.icon,
                    agent.name,
                    agent.status,
                    agent.tier_required,
                    style(&agent.api_endpoint).dim()
                );
            }
        }
        AdminCommand::CreateAgent => {
            let name: String = cliclack::input("Name").interact()?;
            let api_endpoint: String = cliclack::input("Upstream endpoint").interact()?;
            let api_token: String = cliclack::password("Upstream token").mask('▪').interact()?;
            let project_id: String = cliclack::input("Project id").interact()?;
            let mut agent = AgentCreate::new(name, api_endpoint, api_token, project_id);
            agent.tier_required = cliclack::select("Required membership")
                .item("365".to_string(), "Standard", "365")
                .item("3980".to_string(), "Premium", "3980")
                .item("guest".to_string(), "Everyone", "guest")
                .interact()?;

            let created = admin.create_agent(&agent).await?;
            println!("Created agent #{} {}", created.id, created.name);
        }
        AdminCommand::AgentStatus { id, status } => {
            let update = AgentUpdate {
                status: Some(status),
                ..Default::default()
            };
            let agent = admin.update_agent(id, &update).await?;
            println!("{} is now {}", agent.name, agent.status);
        }
        AdminCommand::DeleteAgent { id } => {
            let confirmed = cliclack::confirm(format!("Delete agent #{}?", id))
                .initial_value(false)
                .interact()?;
            if confirmed {
                admin.delete_agent(id).await?;
                println!("Deleted agent #{}", id);
            }
        }
        AdminCommand::Users => {
            for user in admin.list_users().await? {
                println!(
                    "{:>4}  {:<16} {:<16} {}{}",
                    user.id,
                    user.phone,
                    user.tier.to_string(),
                    if user.is_admin { "admin " } else { "" },
                    if user.is_active { "" } else { "disabled" }
                );
            }
        }
        AdminCommand::SetTier { user_id, tier } => {
            let tier = parse_tier(&tier)?;
            let update = UserUpdate {
                tier: Some(tier),
                ..Default::default()
            };
            let user = admin.update_user(user_id, &update).await?;
            println!("{} is now {}", user.phone, user.tier);
        }
        AdminCommand::UserActive { user_id, active } => {
            let update = UserUpdate {
                is_active: Some(active),
                ..Default::default()
            };
            let user = admin.update_user(user_id, &update).await?;
            println!(
                "{} is now {}",
                user.phone,
                if user.is_active { "active" } else { "disabled" }
            );
        }
        AdminCommand::Feedback { status } => {
            let items = admin.list_feedback(status).await?;
            if items.is_empty() {
                println!("No feedback.");
            }
            for item in &items {
                print_feedback(item);
            }
        }
        AdminCommand::FeedbackStatus { id, status } => {
            admin.set_feedback_status(id, status).await?;
            println!("Feedback #{} marked {}", id, status);
        }
    }
    Ok(())
}

fn parse_tier(value: &str) -> Result<Tier> {
    match Tier::from(value.trim().to_string()) {
        Tier::Other(other) => bail!("unknown tier '{}'; use guest, 365 or 3980", other),
        tier => Ok(tier),
    }
}

fn print_feedback(item: &Feedback) {
    println!(
        "#{} [{}] {} from {} at {}",
        item.id,
        item.status,
        item.kind,
        item.user_phone.as_deref().unwrap_or("anonymous"),
        item.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("  {}", item.content);
    if let Some(contact) = &item.contact {
        println!("  {}", style(format!("contact: {}", contact)).dim());
    }
}
