use agenthub::models::user::User;
use agenthub::AuthSession;
use anyhow::{bail, Context, Result};
use cliclack::spinner;
use console::style;

fn ask_credentials(phone: Option<String>) -> Result<(String, String)> {
    let phone = match phone {
        Some(phone) => phone,
        None => cliclack::input("Phone number")
            .validate(|input: &String| {
                if input.trim().is_empty() {
                    Err("A phone number is required")
                } else {
                    Ok(())
                }
            })
            .interact()?,
    };
    let password: String = cliclack::password("Password").mask('▪').interact()?;
    if password.is_empty() {
        bail!("a password is required");
    }
    Ok((phone.trim().to_string(), password))
}

pub async fn handle_login(session: &mut AuthSession, phone: Option<String>) -> Result<()> {
    cliclack::intro(style(" agenthub login ").on_cyan().black())?;
    let (phone, password) = ask_credentials(phone)?;

    let spin = spinner();
    spin.start("Logging in...");
    match session.login(&phone, &password).await {
        Ok(user) => {
            spin.stop(format!("Logged in as {}", user.phone));
            cliclack::outro(format!("Membership: {}", user.tier))?;
            Ok(())
        }
        Err(err) => {
            spin.stop("Login failed");
            Err(err).context("could not log in")
        }
    }
}

pub async fn handle_register(session: &mut AuthSession, phone: Option<String>) -> Result<()> {
    cliclack::intro(style(" agenthub register ").on_cyan().black())?;
    let (phone, password) = ask_credentials(phone)?;

    let spin = spinner();
    spin.start("Creating your account...");
    match session.register(&phone, &password).await {
        Ok(user) => {
            spin.stop(format!("Welcome, {}", user.phone));
            cliclack::outro("You are logged in. Try `agenthub agents` to see what is available.")?;
            Ok(())
        }
        Err(err) => {
            spin.stop("Registration failed");
            Err(err).context("could not register")
        }
    }
}

pub fn handle_logout(session: &mut AuthSession) -> Result<()> {
    session.logout()?;
    println!("Logged out.");
    Ok(())
}

pub async fn handle_whoami(session: &mut AuthSession) -> Result<()> {
    let user = match session.restore().await? {
        Some(user) => user.clone(),
        None => {
            println!("Not logged in. Run `agenthub login` first.");
            return Ok(());
        }
    };
    print_profile(&user);

    // Stats are a nice-to-have; the profile alone is still useful.
    match session.api().user_stats().await {
        Ok(stats) => {
            println!();
            println!("{}", style("Your usage").bold());
            println!("  conversations  {}", stats.total_conversations);
            println!("  time saved     {}", stats.saved_time_display());
            println!("  cost saved     {}", stats.saved_cost);
            println!("  days active    {}", stats.days_active);
            if let Some(agent) = stats.most_used_agent {
                println!(
                    "  favourite      {} {} ({} chats)",
                    agent.icon.unwrap_or_default(),
                    agent.name.unwrap_or_default(),
                    agent.count
                );
            }
            if let Some(agent) = stats.recommended_agent {
                println!("  try next       {} {} (#{})", agent.icon, agent.name, agent.id);
            }
        }
        Err(err) => tracing::warn!("could not load stats: {}", err),
    }
    Ok(())
}

fn print_profile(user: &User) {
    println!("{}", style(&user.phone).bold());
    println!("  membership     {}", user.tier);
    if let Some(expires) = user.tier_expire_at {
        println!("  expires        {}", expires.format("%Y-%m-%d"));
    }
    println!("  member since   {}", user.created_at.format("%Y-%m-%d"));
    if user.is_admin {
        println!("  role           {}", style("admin").magenta());
    }
}
