use agenthub::models::agent::Agent;
use agenthub::ApiClient;
use anyhow::{anyhow, Result};
use console::style;

/// Looks an agent up by numeric id or, failing that, by name.
pub fn find_agent<'a>(agents: &'a [Agent], query: &str) -> Option<&'a Agent> {
    let query = query.trim();
    if let Ok(id) = query.parse::<i64>() {
        if let Some(agent) = agents.iter().find(|agent| agent.id == id) {
            return Some(agent);
        }
    }
    agents
        .iter()
        .find(|agent| agent.name.eq_ignore_ascii_case(query))
        .or_else(|| {
            let needle = query.to_lowercase();
            let mut matches = agents
                .iter()
                .filter(|agent| agent.name.to_lowercase().contains(&needle));
            match (matches.next(), matches.next()) {
                (Some(agent), None) => Some(agent),
                _ => None,
            }
        })
}

pub async fn resolve_agent(api: &ApiClient, query: &str) -> Result<Agent> {
    if let Ok(id) = query.trim().parse::<i64>() {
        match api.agent(id).await {
            Ok(agent) => return Ok(agent),
            Err(err) if err.status() == Some(404) => {}
            Err(err) => return Err(err.into()),
        }
    }
    let agents = api.list_agents().await?;
    find_agent(&agents, query)
        .cloned()
        .ok_or_else(|| anyhow!("no agent matches '{}'; run `agenthub agents` to list them", query))
}

pub fn format_agent_row(agent: &Agent) -> String {
    let marker = if agent.can_access {
        style("●").green()
    } else {
        style("○").dim()
    };
    format!(
        "{} {:>3}  {} {:<24} {}",
        marker,
        agent.id,
        agent.icon,
        agent.name,
        style(agent.description_or_default()).dim()
    )
}

pub async fn handle_agents(api: &ApiClient) -> Result<()> {
    let agents = api.list_agents().await?;
    if agents.is_empty() {
        println!("No agents are available yet.");
        return Ok(());
    }

    let mut category = None;
    for agent in &agents {
        if category != Some(agent.category.as_str()) {
            category = Some(agent.category.as_str());
            println!("{}", style(&agent.category).bold().underlined());
        }
        println!("{}", format_agent_row(agent));
    }

    if agents.iter().any(|agent| !agent.can_access) {
        println!();
        println!(
            "{}",
            style("○ marks agents your membership does not include yet.").dim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agents() -> Vec<Agent> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Copywriter", "can_access": true},
            {"id": 2, "name": "Travel Planner", "can_access": false},
            {"id": 3, "name": "Meal Planner", "can_access": true},
            {"id": 42, "name": "7", "can_access": true}
        ]))
        .unwrap()
    }

    #[test]
    fn test_find_by_id_and_name() {
        let agents = agents();
        assert_eq!(find_agent(&agents, "2").map(|a| a.id), Some(2));
        assert_eq!(find_agent(&agents, "copywriter").map(|a| a.id), Some(1));
        assert_eq!(find_agent(&agents, " Meal Planner ").map(|a| a.id), Some(3));
        // A numeric name still resolves when no id matches.
        assert_eq!(find_agent(&agents, "7").map(|a| a.id), Some(42));
    }

    #[test]
    fn test_partial_name_must_be_unambiguous() {
        let agents = agents();
        assert_eq!(find_agent(&agents, "travel").map(|a| a.id), Some(2));
        assert!(find_agent(&agents, "planner").is_none());
        assert!(find_agent(&agents, "lawyer").is_none());
    }

    #[test]
    fn test_row_contains_id_and_name() {
        let agents = agents();
        let row = format_agent_row(&agents[1]);
        assert!(row.contains("Travel Planner"));
        assert!(row.contains('2'));
    }
}
