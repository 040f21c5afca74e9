use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StateError;
use crate::types::{ChallengeCatalogSnapshot, ScoreboardSnapshot};

/// State cache path, relative to the working directory.
pub const CACHE_PATH: &str = "cache.json";

/// Everything the monitor remembers between polls and across restarts.
///
/// `user_position` always matches the tracked identity's rank inside
/// `last_scoreboard` when that is present, and is 0 otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    #[serde(default)]
    pub last_scoreboard: Option<ScoreboardSnapshot>,
    #[serde(default)]
    pub last_challenges: Option<ChallengeCatalogSnapshot>,
    #[serde(default)]
    pub user_position: u32,
}

impl MonitorState {
    /// True once both snapshot kinds have been observed.
    pub fn is_seeded(&self) -> bool {
        self.last_scoreboard.is_some() && self.last_challenges.is_some()
    }
}

/// JSON file holding the last [`MonitorState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(CACHE_PATH)
    }
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached state. A missing or unreadable cache yields an empty state.
    pub fn load(&self) -> MonitorState {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), "No cache file found or error reading cache: {e}");
                return MonitorState::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(state) => {
                info!("Loaded state from cache: {}", self.path.display());
                state
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Error parsing cache file: {e}");
                MonitorState::default()
            }
        }
    }

    /// Rewrite the cache. Goes through a temp file so a torn write never
    /// replaces the last good document.
    pub fn save(&self, state: &MonitorState) -> Result<(), StateError> {
        let data = serde_json::to_string_pretty(state)?;
        let temp_path = self.path.with_extension("json.tmp");

        std::fs::write(&temp_path, data).map_err(|source| StateError::Write {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|source| StateError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
