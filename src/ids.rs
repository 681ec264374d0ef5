//! External identifier mapping used when emitting SQL.
//!
//! The ids file is a JSON document prepared by hand from the destination
//! database:
//!
//! ```json
//! {
//!   "user_ids": { "sary": "…uuid…" },
//!   "game_ids": { "wordle": "…uuid…" },
//!   "league_id": "…uuid…",
//!   "league_games": { "wordle": { "start_date": "2024-01-01", "end_date": null } }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const USER_PLACEHOLDER: &str = "REPLACE_USER_ID";
pub const GAME_PLACEHOLDER: &str = "REPLACE_GAME_ID";
pub const LEAGUE_PLACEHOLDER: &str = "REPLACE_LEAGUE_ID";

/// Date range a game was active in the league.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GameRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    pub user_ids: HashMap<String, String>,
    pub game_ids: HashMap<String, String>,
    pub league_id: Option<String>,
    pub league_games: BTreeMap<String, GameRange>,
}

impl IdMapping {
    /// Read an ids file. A missing file is treated as an empty mapping.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("ids file not found: {}", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ids file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse ids file {}", path.display()))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        // `null` for any section means the same as leaving it out
        #[derive(Deserialize)]
        struct Nullable {
            user_ids: Option<HashMap<String, String>>,
            game_ids: Option<HashMap<String, String>>,
            league_id: Option<String>,
            league_games: Option<BTreeMap<String, GameRange>>,
        }
        let raw: Nullable = serde_json::from_str(text)?;
        Ok(Self {
            user_ids: raw.user_ids.unwrap_or_default(),
            game_ids: raw.game_ids.unwrap_or_default(),
            league_id: raw.league_id.filter(|id| !id.is_empty()),
            league_games: raw.league_games.unwrap_or_default(),
        })
    }

    pub fn user_id(&self, player: &str) -> &str {
        self.user_ids.get(player).map(String::as_str).unwrap_or(USER_PLACEHOLDER)
    }

    pub fn game_id(&self, slug: &str) -> &str {
        self.game_ids.get(slug).map(String::as_str).unwrap_or(GAME_PLACEHOLDER)
    }

    pub fn league_id(&self) -> &str {
        self.league_id.as_deref().unwrap_or(LEAGUE_PLACEHOLDER)
    }
}

/// True for ids that were never filled in: empty, `REPLACE_*` or `YOUR_*`.
pub fn is_placeholder(id: &str) -> bool {
    id.is_empty() || id.contains("REPLACE_") || id.starts_with("YOUR_")
}
