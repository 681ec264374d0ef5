//! Turning a sheet cell into the score the league actually recorded.
//!
//! The sheet stores some games in a spreadsheet-friendly encoding and scales
//! some crossword scores by a handicap. Each game gets at most one inverse
//! transform, chosen by slug.

use chrono::NaiveDate;

use crate::config::LeagueConfig;
use crate::parse::ScoreValue;

pub const CROSSWORD: &str = "crossword";
pub const WORDLE: &str = "wordle";
pub const CONNECTIONS: &str = "connections";

/// Stored Wordle value for a failed puzzle.
pub const WORDLE_FAIL: i64 = 7;
/// Stored Connections value for a failed puzzle (maximum mistakes).
pub const CONNECTIONS_FAIL: i64 = 4;

const DECIMAL_PLACES: i32 = 4;

/// Inputs identifying one sheet cell.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub game_slug: &'a str,
    pub player: &'a str,
    pub date: NaiveDate,
    /// Handicap fraction for the cell's date column.
    pub handicap: Option<f64>,
}

/// Canonical score for one cell.
pub fn normalize_score(value: ScoreValue, cell: &CellContext<'_>, config: &LeagueConfig) -> ScoreValue {
    let value = match cell.game_slug {
        CROSSWORD if config.crossword_handicapped(cell.player, cell.date) => {
            reverse_handicap(value, cell.handicap)
        }
        WORDLE => wordle_remap(value),
        CONNECTIONS => connections_remap(value),
        _ => value,
    };
    value.rounded(DECIMAL_PLACES)
}

/// Undo a handicap of `handicap` (a fraction in (0, 1]).
pub fn reverse_handicap(value: ScoreValue, handicap: Option<f64>) -> ScoreValue {
    match handicap {
        Some(h) if h > 0.0 => ScoreValue::Decimal(value.as_f64() / h),
        _ => value,
    }
}

/// Sheet stores remaining rows (0-5) or -1 for a fail; stored value is guesses
/// used (1-6) or 7 for a fail.
pub fn wordle_remap(value: ScoreValue) -> ScoreValue {
    let v = value.as_f64();
    if v == -1.0 {
        ScoreValue::Int(WORDLE_FAIL)
    } else if (0.0..=5.0).contains(&v) {
        ScoreValue::Int(6 - value.truncate())
    } else {
        value
    }
}

/// Sheet stores 5 minus mistakes with 0 for a fail; stored value is mistakes
/// (0-4) with a fail counted as 4.
pub fn connections_remap(value: ScoreValue) -> ScoreValue {
    let v = value.as_f64();
    if v == 0.0 {
        ScoreValue::Int(CONNECTIONS_FAIL)
    } else if (1.0..=5.0).contains(&v) {
        ScoreValue::Int(5 - value.truncate())
    } else {
        value
    }
}
