use std::collections::HashSet;

use tracing::debug;

use crate::types::{ChallengeCatalogSnapshot, Event, ScoreboardSnapshot};

/// Rank of the tracked identity, or 0 when it is not on the board.
///
/// `key` is compared case-sensitively against each entry's display name and
/// then its member names; the first entry that matches either way wins.
pub fn find_position(scoreboard: &ScoreboardSnapshot, key: &str) -> u32 {
    scoreboard
        .data
        .iter()
        .find(|entry| entry.name == key || entry.members.iter().any(|m| m.name == key))
        .map(|entry| entry.rank)
        .unwrap_or(0)
}

/// Result of comparing a fresh scoreboard with the previously known rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCheck {
    /// Always the freshly computed rank, whether or not an event fired.
    pub current_rank: u32,
    pub events: Vec<Event>,
}

/// Detect the tracked identity being pushed down the leaderboard.
///
/// Fires only when a prior rank was established and the new rank is
/// numerically larger. Dropping off the board (rank 0) is not a regression.
pub fn check_rank(prior_rank: u32, scoreboard: &ScoreboardSnapshot, key: &str) -> RankCheck {
    let current_rank = find_position(scoreboard, key);
    let mut events = Vec::new();
    if prior_rank > 0 && current_rank > prior_rank {
        debug!(prior_rank, current_rank, "Tracked identity was bypassed");
        events.push(Event::RankRegressed {
            previous_rank: prior_rank,
            new_rank: current_rank,
        });
    }
    RankCheck {
        current_rank,
        events,
    }
}

/// Detect challenge ids present now but not in the prior catalog.
///
/// With no prior catalog nothing is reported; the current one becomes the
/// baseline. Removed or edited challenges are ignored. Events come out in
/// ascending id order.
pub fn check_challenges(
    prior: Option<&ChallengeCatalogSnapshot>,
    current: &ChallengeCatalogSnapshot,
) -> Vec<Event> {
    let Some(prior) = prior else {
        return Vec::new();
    };
    let known: HashSet<i64> = prior.data.iter().map(|c| c.id).collect();

    let mut fresh: Vec<_> = current
        .data
        .iter()
        .filter(|c| !known.contains(&c.id))
        .collect();
    fresh.sort_by_key(|c| c.id);
    fresh.dedup_by_key(|c| c.id);

    fresh
        .into_iter()
        .map(|c| Event::ChallengePublished {
            id: c.id,
            name: c.name.clone(),
            category: c.category.clone(),
            value: c.value,
        })
        .collect()
}
