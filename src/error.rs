use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::DuplicateReport;
use crate::sql::SqlKey;

/// Structural problems that make a sheet unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("could not find header row (needs \"puz\", \"player\" and \"cat.\")")]
    NoHeader,

    #[error("could not find header row with dates")]
    NoDateColumn,

    #[error("no dates found")]
    NoDates,

    #[error("could not find data row layout (no 'raw' row after header)")]
    NoRawRow,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {kind}", .path.display())]
    Layout { path: PathBuf, kind: LayoutError },

    #[error("{0}")]
    DuplicateScores(DuplicateReport),

    #[error("{}", format_sql_duplicates(.0))]
    DuplicateSqlKeys(Vec<SqlKey>),

    #[error("ids file must contain a real game_ids.{game} id (not a placeholder)")]
    PlaceholderId { game: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

const SQL_DUPLICATE_PREVIEW: usize = 30;

fn format_sql_duplicates(keys: &[SqlKey]) -> String {
    let mut msg = String::from(
        "Duplicate (user_id, game_id, date) in generated SQL, would violate scores_user_game_date_unique:",
    );
    for key in keys.iter().take(SQL_DUPLICATE_PREVIEW) {
        msg.push_str(&format!(
            "\n  {}... {}... {}",
            abbreviate(&key.user_id),
            abbreviate(&key.game_id),
            key.date
        ));
    }
    if keys.len() > SQL_DUPLICATE_PREVIEW {
        msg.push_str("\n  ... and more");
    }
    msg
}

fn abbreviate(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_names_file() {
        let err = Error::Layout {
            path: PathBuf::from("league.csv"),
            kind: LayoutError::NoDates,
        };
        assert_eq!(err.to_string(), "league.csv: no dates found");
    }

    #[test]
    fn test_sql_duplicates_abbreviate_ids() {
        let key = SqlKey {
            user_id: "0123456789abcdef".to_string(),
            game_id: "short".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        };
        let msg = Error::DuplicateSqlKeys(vec![key]).to_string();
        assert!(msg.ends_with("\n  01234567... short... 2025-12-01"));
    }
}
