//! Merging sheets into one batch and enforcing score uniqueness.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::{ScoreKey, ScoreRecord, SheetExtract, StartingWordRecord};

/// What to do when the same (player, game, date) shows up more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the batch.
    #[default]
    Reject,
    /// Keep the first occurrence and warn.
    KeepFirst,
}

/// Final merged output of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Backfill {
    pub scores: Vec<ScoreRecord>,
    pub starting_words: Vec<StartingWordRecord>,
}

/// Conflicting score keys and the files each came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    pub conflicts: BTreeMap<ScoreKey, BTreeSet<PathBuf>>,
}

const DUPLICATE_PREVIEW: usize = 20;

impl DuplicateReport {
    /// Number of records beyond the first for each conflicting key.
    pub fn extra_records(&self, scores: &[ScoreRecord]) -> usize {
        let mut seen = HashSet::new();
        scores
            .iter()
            .filter(|s| self.conflicts.contains_key(&s.key()) && !seen.insert(s.key()))
            .count()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Duplicate scores (same player, game, date) found across CSV files."
        )?;
        write!(f, "This would violate scores_user_game_date_unique. Sources:")?;
        for (key, files) in self.conflicts.iter().take(DUPLICATE_PREVIEW) {
            let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            write!(
                f,
                "\n  ({}, {}, {}) from: {}",
                key.player,
                key.game_slug,
                key.date,
                files.join(", ")
            )?;
        }
        if self.conflicts.len() > DUPLICATE_PREVIEW {
            write!(f, "\n  ... and more")?;
        }
        Ok(())
    }
}

/// Accumulates sheets in the order they are processed.
#[derive(Debug, Default)]
pub struct Aggregator {
    scores: Vec<ScoreRecord>,
    starting_words: Vec<StartingWordRecord>,
    seen_words: HashSet<StartingWordRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sheet: SheetExtract) {
        self.scores.extend(sheet.scores);
        for word in sheet.starting_words {
            if self.seen_words.insert(word.clone()) {
                self.starting_words.push(word);
            }
        }
    }

    /// Conflicting keys so far, or `None` if every score is unique.
    pub fn duplicates(&self) -> Option<DuplicateReport> {
        let mut by_key: BTreeMap<ScoreKey, Vec<&ScoreRecord>> = BTreeMap::new();
        for score in &self.scores {
            by_key.entry(score.key()).or_default().push(score);
        }
        let conflicts: BTreeMap<ScoreKey, BTreeSet<PathBuf>> = by_key
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(key, group)| (key, group.iter().map(|s| s.source.clone()).collect()))
            .collect();

        if conflicts.is_empty() {
            None
        } else {
            Some(DuplicateReport { conflicts })
        }
    }

    /// Apply `policy` to duplicate keys and return the merged batch.
    pub fn finish(self, policy: DuplicatePolicy) -> Result<Backfill> {
        let Some(report) = self.duplicates() else {
            return Ok(Backfill {
                scores: self.scores,
                starting_words: self.starting_words,
            });
        };

        match policy {
            DuplicatePolicy::Reject => Err(Error::DuplicateScores(report)),
            DuplicatePolicy::KeepFirst => {
                let removed = report.extra_records(&self.scores);
                let mut seen = HashSet::new();
                let scores: Vec<ScoreRecord> = self
                    .scores
                    .into_iter()
                    .filter(|s| seen.insert(s.key()))
                    .collect();
                log::warn!(
                    "{} duplicate score(s) removed (same player/game/date in multiple CSVs). First occurrence kept.",
                    removed
                );
                Ok(Backfill {
                    scores,
                    starting_words: self.starting_words,
                })
            }
        }
    }
}
