//! League roster and scoring conventions.
//!
//! Everything the extractor needs to know about a particular league lives in
//! [`LeagueConfig`] so tests can swap in synthetic rosters. The default value
//! describes the league the sheets were exported from.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Roster, game table and crossword handicap rules for one league.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Known player identifiers (lowercase). Rows for anyone else are skipped.
    pub players: HashSet<String>,
    /// Sheet game name (lowercase) -> canonical slug.
    pub game_slugs: HashMap<String, String>,
    /// Players whose crossword scores are always handicapped.
    pub crossword_always_handicapped: HashSet<String>,
    /// Player handicapped only before `handicap_cutoff`.
    pub conditional_handicap_player: Option<String>,
    /// First date on which the conditional player is no longer handicapped.
    pub handicap_cutoff: NaiveDate,
    /// Rows above the header to use when no row mentions "handicap".
    /// `None` means such sheets carry no handicaps at all.
    pub handicap_row_fallback: Option<usize>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        let game_slugs = [
            ("crossword", "crossword"),
            ("connections", "connections"),
            ("pyramid", "pyramid"),
            ("bee", "spelling-bee"),
            ("wordle", "wordle"),
            ("waffle", "waffle"),
            ("keyword", "keyword"),
            ("flashback", "flashback"),
            ("quintumble", "quintumble"),
            ("bracketcity", "bracket-city"),
        ];
        Self {
            players: to_set(&["sary", "sal", "bob", "stolowd"]),
            game_slugs: game_slugs
                .iter()
                .map(|(name, slug)| (name.to_string(), slug.to_string()))
                .collect(),
            crossword_always_handicapped: to_set(&["sary", "stolowd"]),
            conditional_handicap_player: Some("sal".to_string()),
            handicap_cutoff: NaiveDate::from_ymd_opt(2024, 11, 24).unwrap_or(NaiveDate::MIN),
            handicap_row_fallback: Some(2),
        }
    }
}

impl LeagueConfig {
    /// Load a JSON override; fields left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config.lowercased())
    }

    /// Sheet cells are matched lowercased, so names and game keys must be too.
    fn lowercased(self) -> Self {
        let lower = |names: HashSet<String>| names.iter().map(|n| n.to_lowercase()).collect();
        Self {
            players: lower(self.players),
            game_slugs: self
                .game_slugs
                .into_iter()
                .map(|(name, slug)| (name.to_lowercase(), slug))
                .collect(),
            crossword_always_handicapped: lower(self.crossword_always_handicapped),
            conditional_handicap_player: self.conditional_handicap_player.map(|p| p.to_lowercase()),
            ..self
        }
    }

    pub fn is_player(&self, player: &str) -> bool {
        self.players.contains(player)
    }

    /// Canonical slug for a (lowercased) sheet game name.
    pub fn slug_for(&self, game_name: &str) -> String {
        match self.game_slugs.get(game_name) {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => game_name.replace(' ', "_"),
        }
    }

    /// True if this player's crossword score on `date` was handicapped.
    pub fn crossword_handicapped(&self, player: &str, date: NaiveDate) -> bool {
        if self.crossword_always_handicapped.contains(player) {
            return true;
        }
        match &self.conditional_handicap_player {
            Some(p) if p == player => date < self.handicap_cutoff,
            _ => false,
        }
    }
}

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
