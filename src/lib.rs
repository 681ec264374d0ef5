//! League Backfill
//!
//! Recovers the scores a game league actually recorded from its spreadsheet
//! exports, undoing crossword handicaps and the sheet's score encodings, and
//! produces JSON or SQL ready for loading into the league database.
//!
//! This library provides:
//! - `layout`: locating the header, handicap and data rows of a sheet
//! - `extract` / `normalize`: per-sheet score extraction and canonicalization
//! - `aggregate`: merging sheets and enforcing score uniqueness
//! - `sql`: INSERT and UPDATE generation
//!
//! Binaries:
//! - `backfill-league`: JSON or SQL backfill from one or more CSV exports
//! - `update-scores`: in-place conversion of stored Wordle / Connections scores

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod ids;
pub mod layout;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod sql;

pub use aggregate::{Backfill, DuplicatePolicy};
pub use config::LeagueConfig;
pub use error::{Error, LayoutError, Result};
pub use extract::{ScoreRecord, StartingWordRecord};
