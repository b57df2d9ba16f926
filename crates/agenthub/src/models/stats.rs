use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostUsedAgent {
    pub name: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAgent {
    pub id: i64,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Usage summary shown on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_conversations: i64,
    pub saved_cost: i64,
    pub saved_time_minutes: i64,
    pub days_active: i64,
    #[serde(default)]
    pub most_used_agent: Option<MostUsedAgent>,
    #[serde(default)]
    pub recommended_agent: Option<RecommendedAgent>,
}

impl UserStats {
    /// Saved time rendered as hours and minutes, e.g. `2h 05m`.
    pub fn saved_time_display(&self) -> String {
        let minutes = self.saved_time_minutes.max(0);
        if minutes < 60 {
            format!("{}m", minutes)
        } else {
            format!("{}h {:02}m", minutes / 60, minutes % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_without_recommendation() {
        let stats: UserStats = serde_json::from_value(json!({
            "total_conversations": 25,
            "saved_cost": 375,
            "saved_time_minutes": 125,
            "days_active": 9,
            "most_used_agent": {"name": "Copywriter", "icon": "✍️", "count": 12},
            "recommended_agent": null
        }))
        .unwrap();

        assert_eq!(stats.most_used_agent.unwrap().count, 12);
        assert!(stats.recommended_agent.is_none());
    }

    #[test]
    fn test_saved_time_display() {
        let mut stats = UserStats {
            total_conversations: 0,
            saved_cost: 0,
            saved_time_minutes: 45,
            days_active: 1,
            most_used_agent: None,
            recommended_agent: None,
        };
        assert_eq!(stats.saved_time_display(), "45m");
        stats.saved_time_minutes = 125;
        assert_eq!(stats.saved_time_display(), "2h 05m");
    }
}
