//! Per-sheet extraction: dates, handicaps, starting words and score rows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::LeagueConfig;
use crate::error::{Error, LayoutError, Result};
use crate::grid::Grid;
use crate::layout::{self, DataLayout, LayoutAnchor};
use crate::normalize::{normalize_score, CellContext};
use crate::parse::{parse_date, parse_handicap, parse_score_cell, ScoreValue};

/// One player's canonical score for one game on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub date: NaiveDate,
    pub game_slug: String,
    pub player: String,
    pub raw_score: ScoreValue,
    /// File the score was read from.
    #[serde(skip)]
    pub source: PathBuf,
}

impl ScoreRecord {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            player: self.player.clone(),
            game_slug: self.game_slug.clone(),
            date: self.date,
        }
    }
}

/// Identity of a score; unique across a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoreKey {
    pub player: String,
    pub game_slug: String,
    pub date: NaiveDate,
}

/// The day's starting word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StartingWordRecord {
    pub date: NaiveDate,
    pub word: String,
}

/// Everything read from one sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetExtract {
    pub scores: Vec<ScoreRecord>,
    pub starting_words: Vec<StartingWordRecord>,
}

/// Label cell preceding the starting words.
const STARTING_WORD_LABEL: &str = "start w/:";

/// Load and extract one CSV file.
pub fn process_file(path: &Path, config: &LeagueConfig) -> Result<SheetExtract> {
    let grid = Grid::load(path)?;
    extract_sheet(&grid, path, config)
}

/// Extract scores and starting words from a loaded sheet.
///
/// Structural problems are fatal for the sheet; unusable rows and cells are
/// skipped.
pub fn extract_sheet(grid: &Grid, source: &Path, config: &LeagueConfig) -> Result<SheetExtract> {
    let layout_err = |kind: LayoutError| Error::Layout {
        path: source.to_path_buf(),
        kind,
    };

    let anchor = layout::locate(grid, config).map_err(layout_err)?;
    let dates = extract_dates(grid.row(anchor.header_row), anchor.first_date_col);
    if dates.is_empty() {
        return Err(layout_err(LayoutError::NoDates));
    }
    let handicaps = extract_handicaps(grid, &anchor, dates.len());

    let starting_words = match layout::find_starting_words_row(grid, anchor.header_row) {
        Some(row) => extract_starting_words(grid.row(row), anchor.first_date_col, &dates),
        None => Vec::new(),
    };

    let data_layout = layout::detect_data_layout(grid, anchor.header_row, anchor.first_date_col)
        .map_err(layout_err)?;

    let mut scores = Vec::new();
    for row in grid.rows().skip(anchor.header_row + 1) {
        let Some((game_name, player)) = classify_row(row, &data_layout, config) else {
            continue;
        };
        let slug = config.slug_for(&game_name);

        for (idx, date) in dates.iter().enumerate() {
            let Some(cell) = row.get(data_layout.score_start_col + idx) else {
                break;
            };
            let Some(value) = parse_score_cell(cell) else {
                continue;
            };
            let ctx = CellContext {
                game_slug: &slug,
                player: &player,
                date: *date,
                handicap: handicaps[idx],
            };
            scores.push(ScoreRecord {
                date: *date,
                game_slug: slug.clone(),
                player: player.clone(),
                raw_score: normalize_score(value, &ctx, config),
                source: source.to_path_buf(),
            });
        }
    }

    log::debug!(
        "{}: {} dates, {} scores, {} starting words",
        source.display(),
        dates.len(),
        scores.len(),
        starting_words.len()
    );

    Ok(SheetExtract {
        scores,
        starting_words,
    })
}

/// Contiguous run of header dates starting at `first_date_col`.
pub fn extract_dates(header: &[String], first_date_col: usize) -> Vec<NaiveDate> {
    header
        .iter()
        .skip(first_date_col)
        .map_while(|cell| parse_date(cell))
        .collect()
}

/// Handicap fraction for each date column; `None` where the cell is not a percentage.
pub fn extract_handicaps(grid: &Grid, anchor: &LayoutAnchor, num_dates: usize) -> Vec<Option<f64>> {
    (0..num_dates)
        .map(|idx| {
            let row = anchor.handicap_row?;
            grid.cell(row, anchor.first_date_col + idx)
                .and_then(parse_handicap)
        })
        .collect()
}

/// Words in the starting-word row, one column left of their date.
pub fn extract_starting_words(
    row: &[String],
    first_date_col: usize,
    dates: &[NaiveDate],
) -> Vec<StartingWordRecord> {
    let Some(word_start) = first_date_col.checked_sub(1) else {
        return Vec::new();
    };
    if row.len() < word_start + dates.len() {
        log::warn!(
            "starting-word row covers {} of {} dates",
            row.len().saturating_sub(word_start),
            dates.len()
        );
    }

    dates
        .iter()
        .enumerate()
        .filter_map(|(idx, date)| {
            let word = row.get(word_start + idx)?.trim();
            if word.is_empty() || word.eq_ignore_ascii_case(STARTING_WORD_LABEL) {
                return None;
            }
            Some(StartingWordRecord {
                date: *date,
                word: word.to_string(),
            })
        })
        .collect()
}

/// (game name, player) for a raw score row, lowercased; `None` for any other row.
fn classify_row(row: &[String], layout: &DataLayout, config: &LeagueConfig) -> Option<(String, String)> {
    if row.len() <= layout.last_label_col() {
        return None;
    }
    let label = |col: usize| row[col].trim().to_lowercase();

    if label(layout.category_col) != "raw" {
        return None;
    }
    let game_name = label(layout.game_col);
    let player = label(layout.player_col);
    if game_name.is_empty() || !config.is_player(&player) {
        return None;
    }
    Some((game_name, player))
}
