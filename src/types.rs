use serde::{Deserialize, Serialize};

/// `GET /scoreboard` payload. Persisted as-is in the state cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardSnapshot {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<StandingEntry>,
}

/// A team (or individual, in user mode) standing on the scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    /// 1-based position; lower is better.
    #[serde(rename = "pos")]
    pub rank: u32,
    #[serde(default)]
    pub account_id: i64,
    #[serde(default)]
    pub account_url: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub oauth_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub bracket_id: Option<String>,
    #[serde(default)]
    pub bracket_name: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub oauth_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub bracket_id: Option<String>,
    #[serde(default)]
    pub bracket_name: Option<String>,
}

/// `GET /challenges` payload, kept sorted by ascending challenge id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeCatalogSnapshot {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ChallengeEntry>,
}

impl ChallengeCatalogSnapshot {
    pub fn sort_by_id(&mut self) {
        self.data.sort_by_key(|c| c.id);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Point value.
    #[serde(default)]
    pub value: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub solves: i64,
    #[serde(default)]
    pub solved_by_me: bool,
}

/// A notable change between two successive polls. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The tracked identity moved to a numerically larger (worse) rank.
    RankRegressed { previous_rank: u32, new_rank: u32 },
    ChallengePublished {
        id: i64,
        name: String,
        category: String,
        value: i64,
    },
}

/// Rendered push notification for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub title: String,
    pub tags: Vec<String>,
    /// ntfy priority, 1 (min) to 5 (urgent).
    pub priority: u8,
}

impl Event {
    pub fn notification(&self) -> Notification {
        match self {
            Event::RankRegressed {
                previous_rank,
                new_rank,
            } => Notification {
                message: format!(
                    "🏆 You've been bypassed on the leaderboard! New position: #{new_rank} (was #{previous_rank})"
                ),
                title: "CTFd Leaderboard Alert".to_string(),
                tags: vec!["warning".to_string(), "leaderboard".to_string()],
                priority: 4,
            },
            Event::ChallengePublished {
                name,
                category,
                value,
                ..
            } => Notification {
                message: format!("🎯 New challenge released: {name} ({category}) - {value} points"),
                title: "New CTFd Challenge".to_string(),
                tags: vec!["challenge".to_string(), "new".to_string()],
                priority: 3,
            },
        }
    }
}

/// Outcome of one monitor cycle, emitted as a JSON line by the reporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub timestamp: String,
    pub user_position: u32,
    pub rank_alerts: usize,
    pub new_challenges: usize,
    pub notified: usize,
    pub notify_failures: usize,
    pub persisted: bool,
}
