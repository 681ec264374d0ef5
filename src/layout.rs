//! Locating the meaningful rows and columns inside a league sheet.
//!
//! Sheets are loosely structured: a header row somewhere near the top holds
//! the column labels and a run of dates, a handicap row sits above it, and
//! per-player data rows follow. Nothing here knows about scores, only where
//! things are.

use crate::config::LeagueConfig;
use crate::error::LayoutError;
use crate::grid::Grid;
use crate::parse::parse_date;

/// Labels that must all appear in the header row.
const HEADER_MARKERS: [&str; 3] = ["puz", "player", "cat."];

/// Number of rows below the header searched for the first "raw" row.
const RAW_ROW_SCAN: usize = 5;

/// Positions inferred once per sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAnchor {
    pub header_row: usize,
    /// `None` when no handicap row could be located.
    pub handicap_row: Option<usize>,
    pub first_date_col: usize,
}

/// Locate header row, first date column and handicap row.
pub fn locate(grid: &Grid, config: &LeagueConfig) -> Result<LayoutAnchor, LayoutError> {
    let header_row = find_header_row(grid).ok_or(LayoutError::NoHeader)?;
    let first_date_col = grid
        .row(header_row)
        .iter()
        .position(|cell| parse_date(cell).is_some())
        .ok_or(LayoutError::NoDateColumn)?;
    let handicap_row = find_handicap_row(grid, header_row, config.handicap_row_fallback);

    log::debug!(
        "header row {}, first date column {}, handicap row {:?}",
        header_row,
        first_date_col,
        handicap_row
    );

    Ok(LayoutAnchor {
        header_row,
        handicap_row,
        first_date_col,
    })
}

fn find_header_row(grid: &Grid) -> Option<usize> {
    grid.rows().position(|row| {
        HEADER_MARKERS
            .iter()
            .all(|marker| row.iter().any(|cell| cell.as_str() == *marker))
    })
}

fn row_contains(row: &[String], needle: &str) -> bool {
    row.iter().any(|cell| cell.to_lowercase().contains(needle))
}

/// Nearest row above the header mentioning "xword handicap", else the nearest
/// mentioning "handicap", else `fallback` rows above the header.
fn find_handicap_row(grid: &Grid, header_row: usize, fallback: Option<usize>) -> Option<usize> {
    for needle in ["xword handicap", "handicap"] {
        if let Some(idx) = (0..header_row)
            .rev()
            .find(|&i| row_contains(grid.row(i), needle))
        {
            return Some(idx);
        }
    }

    let offset = fallback?;
    match header_row.checked_sub(offset) {
        Some(idx) => {
            log::debug!("no handicap label above header, assuming row {}", idx);
            Some(idx)
        }
        None => {
            log::warn!(
                "no handicap row found and header row {} has fewer than {} rows above it",
                header_row,
                offset
            );
            None
        }
    }
}

/// First row after the header with a "start w" label, if any.
pub fn find_starting_words_row(grid: &Grid, header_row: usize) -> Option<usize> {
    (header_row + 1..grid.len()).find(|&i| row_contains(grid.row(i), "start w"))
}

/// Where game, player and category sit in a data row, and where scores begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    pub game_col: usize,
    pub player_col: usize,
    pub category_col: usize,
    pub score_start_col: usize,
}

impl DataLayout {
    /// Category label in the first date column; scores start one column right.
    fn raw_at_date(first_date_col: usize) -> Option<Self> {
        Some(Self {
            game_col: first_date_col.checked_sub(2)?,
            player_col: first_date_col - 1,
            category_col: first_date_col,
            score_start_col: first_date_col + 1,
        })
    }

    /// Category label just left of the first date column; scores start under the dates.
    fn raw_before_date(first_date_col: usize) -> Option<Self> {
        Some(Self {
            game_col: first_date_col.checked_sub(3)?,
            player_col: first_date_col - 2,
            category_col: first_date_col - 1,
            score_start_col: first_date_col,
        })
    }

    /// Rightmost of the label columns; shorter rows cannot be classified.
    pub fn last_label_col(&self) -> usize {
        self.game_col.max(self.player_col).max(self.category_col)
    }
}

fn is_raw(cell: Option<&str>) -> bool {
    cell.is_some_and(|c| c.trim().eq_ignore_ascii_case("raw"))
}

/// Detect the data-row layout from the first "raw" row just below the header.
///
/// Two layouts are known: "raw" in the first date column, or "raw" one column
/// to its left. Whichever appears first wins and applies to the whole sheet.
pub fn detect_data_layout(
    grid: &Grid,
    header_row: usize,
    first_date_col: usize,
) -> Result<DataLayout, LayoutError> {
    let end = (header_row + 1 + RAW_ROW_SCAN).min(grid.len());
    for i in header_row + 1..end {
        let row = grid.row(i);
        if row.len() <= first_date_col {
            continue;
        }
        if is_raw(row.get(first_date_col).map(String::as_str)) {
            if let Some(layout) = DataLayout::raw_at_date(first_date_col) {
                return Ok(layout);
            }
        }
        let before = first_date_col
            .checked_sub(1)
            .and_then(|col| row.get(col))
            .map(String::as_str);
        if is_raw(before) {
            if let Some(layout) = DataLayout::raw_before_date(first_date_col) {
                return Ok(layout);
            }
        }
    }
    Err(LayoutError::NoRawRow)
}
