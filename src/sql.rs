//! SQL generation for the league database.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::aggregate::Backfill;
use crate::error::{Error, Result};
use crate::ids::{is_placeholder, IdMapping};
use crate::normalize::{CONNECTIONS, CONNECTIONS_FAIL, WORDLE, WORDLE_FAIL};

/// Unique key of `public.scores`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlKey {
    pub user_id: String,
    pub game_id: String,
    pub date: NaiveDate,
}

/// Generated statements plus counters for the run summary.
#[derive(Debug, Clone, Default)]
pub struct SqlBatch {
    pub statements: Vec<String>,
    pub score_inserts: usize,
    pub skipped_scores: usize,
}

impl SqlBatch {
    pub fn to_sql(&self) -> String {
        self.statements.join("\n")
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// INSERT statements for a whole backfill.
///
/// Rows whose ids are missing or look like placeholders are skipped with a
/// warning unless `allow_placeholders` is set. Two scores resolving to the same
/// (user, game, date) are an error.
pub fn backfill_statements(
    backfill: &Backfill,
    ids: &IdMapping,
    allow_placeholders: bool,
) -> Result<SqlBatch> {
    let placeholder = |id: &str| !allow_placeholders && is_placeholder(id);
    let league_id = ids.league_id();
    let mut batch = SqlBatch::default();

    for (slug, range) in &ids.league_games {
        let Some(start_date) = range.start_date.as_deref() else {
            continue;
        };
        let game_id = ids.game_id(slug);
        if placeholder(game_id) || placeholder(league_id) {
            log::warn!("skipped league_game for {}: no valid game_id/league_id", slug);
            continue;
        }
        let end_date = range.end_date.as_deref().map(quote);
        batch.statements.push(format!(
            "INSERT INTO public.league_game (leagueid, gameid, start_date, end_date) VALUES ({}, {}, {}, {});",
            quote(league_id),
            quote(game_id),
            quote(start_date),
            end_date.as_deref().unwrap_or("NULL")
        ));
    }

    let mut seen_keys = HashSet::new();
    let mut duplicates = Vec::new();
    let mut user_games = BTreeSet::new();
    for score in &backfill.scores {
        let user_id = ids.user_id(&score.player);
        let game_id = ids.game_id(&score.game_slug);
        if placeholder(user_id) || placeholder(game_id) {
            batch.skipped_scores += 1;
            continue;
        }
        let key = SqlKey {
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            date: score.date,
        };
        if !seen_keys.insert(key.clone()) {
            duplicates.push(key);
        }
        batch.statements.push(format!(
            "INSERT INTO public.scores (user_id, game_id, date, score) VALUES ({}, {}, '{}', {});",
            quote(user_id),
            quote(game_id),
            score.date,
            score.raw_score
        ));
        batch.score_inserts += 1;
        user_games.insert((user_id, game_id));
    }
    if !duplicates.is_empty() {
        return Err(Error::DuplicateSqlKeys(duplicates));
    }
    if batch.skipped_scores > 0 {
        log::warn!(
            "skipped {} score row(s): no valid user_id/game_id mapping. Use --ids with a JSON file that has your real ids.",
            batch.skipped_scores
        );
    }

    for (user_id, game_id) in user_games {
        batch.statements.push(format!(
            "INSERT INTO public.user_games (user_id, game_id) VALUES ({}, {}) ON CONFLICT (game_id, user_id) DO NOTHING;",
            quote(user_id),
            quote(game_id)
        ));
    }

    if placeholder(league_id) {
        if !backfill.starting_words.is_empty() {
            log::warn!("skipped league_starting_words: no valid league_id. Set league_id in your ids file.");
        }
    } else {
        for word in &backfill.starting_words {
            batch.statements.push(format!(
                "INSERT INTO public.league_starting_words (league_id, date, word) VALUES ({}, '{}', {});",
                quote(league_id),
                word.date,
                quote(&word.word)
            ));
        }
    }

    Ok(batch)
}

/// Games whose already-stored scores can be converted in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreUpdate {
    Wordle,
    Connections,
}

impl ScoreUpdate {
    pub fn slug(self) -> &'static str {
        match self {
            ScoreUpdate::Wordle => WORDLE,
            ScoreUpdate::Connections => CONNECTIONS,
        }
    }

    fn description(self) -> &'static str {
        match self {
            ScoreUpdate::Wordle => {
                "Convert Wordle scores from \"remaining slots\" (0-5, -1 fail) to \"guesses\" (1-6, 7 fail)"
            }
            ScoreUpdate::Connections => {
                "Convert Connections: spreadsheet 5=0 mistakes, 4=1, 3=2, 2=3, 1=4, 0=fail -> DB stores mistakes (0-4), fail=4"
            }
        }
    }

    fn case_arms(self) -> String {
        match self {
            ScoreUpdate::Wordle => format!(
                "  WHEN score = -1 THEN {}\n  WHEN score >= 0 AND score <= 5 THEN 6 - score",
                WORDLE_FAIL
            ),
            ScoreUpdate::Connections => format!(
                "  WHEN score = 0 THEN {}\n  WHEN score >= 1 AND score <= 5 THEN 5 - score",
                CONNECTIONS_FAIL
            ),
        }
    }

    /// UPDATE converting stored rows for this game. Refuses placeholder ids.
    pub fn statement(self, ids: &IdMapping) -> Result<String> {
        let game_id = ids.game_ids.get(self.slug()).map(String::as_str).unwrap_or("");
        if is_placeholder(game_id) || game_id.contains("REPLACE") {
            return Err(Error::PlaceholderId {
                game: self.slug().to_string(),
            });
        }
        Ok(format!(
            "-- {}\nUPDATE public.scores\nSET score = CASE\n{}\n  ELSE score\nEND\nWHERE game_id = {};\n",
            self.description(),
            self.case_arms(),
            quote(game_id)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ScoreRecord, StartingWordRecord};
    use crate::parse::ScoreValue;
    use std::path::PathBuf;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    fn score(player: &str, game: &str, d: u32, value: ScoreValue) -> ScoreRecord {
        ScoreRecord {
            date: day(d),
            game_slug: game.to_string(),
            player: player.to_string(),
            raw_score: value,
            source: PathBuf::from("a.csv"),
        }
    }

    fn ids() -> IdMapping {
        IdMapping::from_json(
            r#"{
                "user_ids": {"sary": "u-sary", "bob": "u-bob", "sal": "YOUR_SAL_ID"},
                "game_ids": {"crossword": "g-xw", "wordle": "g-wordle", "connections": "REPLACE_GAME_ID"},
                "league_id": "L1",
                "league_games": {
                    "wordle": {"start_date": "2024-01-01", "end_date": "2024-06-30"},
                    "crossword": {"start_date": "2024-01-01"},
                    "waffle": {"start_date": "2024-01-01"},
                    "bee": {}
                }
            }"#,
        )
        .unwrap()
    }

    fn backfill() -> Backfill {
        Backfill {
            scores: vec![
                score("sary", "crossword", 1, ScoreValue::Decimal(20.0)),
                score("bob", "wordle", 1, ScoreValue::Int(7)),
                score("bob", "wordle", 2, ScoreValue::Int(3)),
                score("sal", "wordle", 1, ScoreValue::Int(4)),
                score("bob", "connections", 1, ScoreValue::Int(0)),
            ],
            starting_words: vec![StartingWordRecord {
                date: day(1),
                word: "o'neil".to_string(),
            }],
        }
    }

    #[test]
    fn test_backfill_statements() {
        let batch = backfill_statements(&backfill(), &ids(), false).unwrap();
        assert_eq!(batch.score_inserts, 3);
        assert_eq!(batch.skipped_scores, 2);
        assert_eq!(
            batch.statements,
            vec![
                "INSERT INTO public.league_game (leagueid, gameid, start_date, end_date) VALUES ('L1', 'g-xw', '2024-01-01', NULL);",
                "INSERT INTO public.league_game (leagueid, gameid, start_date, end_date) VALUES ('L1', 'g-wordle', '2024-01-01', '2024-06-30');",
                "INSERT INTO public.scores (user_id, game_id, date, score) VALUES ('u-sary', 'g-xw', '2025-12-01', 20.0);",
                "INSERT INTO public.scores (user_id, game_id, date, score) VALUES ('u-bob', 'g-wordle', '2025-12-01', 7);",
                "INSERT INTO public.scores (user_id, game_id, date, score) VALUES ('u-bob', 'g-wordle', '2025-12-02', 3);",
                "INSERT INTO public.user_games (user_id, game_id) VALUES ('u-bob', 'g-wordle') ON CONFLICT (game_id, user_id) DO NOTHING;",
                "INSERT INTO public.user_games (user_id, game_id) VALUES ('u-sary', 'g-xw') ON CONFLICT (game_id, user_id) DO NOTHING;",
                "INSERT INTO public.league_starting_words (league_id, date, word) VALUES ('L1', '2025-12-01', 'o''neil');",
            ]
        );
    }

    #[test]
    fn test_allow_placeholders_keeps_rows() {
        let batch = backfill_statements(&backfill(), &ids(), true).unwrap();
        assert_eq!(batch.score_inserts, 5);
        assert_eq!(batch.skipped_scores, 0);
        assert!(batch
            .statements
            .iter()
            .any(|s| s.contains("'YOUR_SAL_ID', 'g-wordle', '2025-12-01', 4")));
    }

    #[test]
    fn test_placeholder_league_skips_starting_words() {
        let mut ids = ids();
        ids.league_id = None;
        let batch = backfill_statements(&backfill(), &ids, false).unwrap();
        assert!(!batch.to_sql().contains("league_starting_words"));
        assert!(!batch.to_sql().contains("league_game "));
    }

    #[test]
    fn test_duplicate_sql_keys_are_fatal() {
        let mut ids = ids();
        // two players mapped onto the same user
        ids.user_ids.insert("sary".to_string(), "u-bob".to_string());
        let mut data = backfill();
        data.scores.push(score("sary", "wordle", 2, ScoreValue::Int(5)));
        let err = backfill_statements(&data, &ids, false).unwrap_err();
        assert!(matches!(err, Error::DuplicateSqlKeys(ref keys) if keys.len() == 1));
    }

    #[test]
    fn test_wordle_update() {
        let sql = ScoreUpdate::Wordle.statement(&ids()).unwrap();
        assert_eq!(
            sql,
            "-- Convert Wordle scores from \"remaining slots\" (0-5, -1 fail) to \"guesses\" (1-6, 7 fail)\n\
             UPDATE public.scores\n\
             SET score = CASE\n  \
             WHEN score = -1 THEN 7\n  \
             WHEN score >= 0 AND score <= 5 THEN 6 - score\n  \
             ELSE score\n\
             END\n\
             WHERE game_id = 'g-wordle';\n"
        );
    }

    #[test]
    fn test_connections_update_refuses_placeholder() {
        let err = ScoreUpdate::Connections.statement(&ids()).unwrap_err();
        assert!(matches!(err, Error::PlaceholderId { ref game } if game == "connections"));

        let missing = IdMapping::default();
        assert!(ScoreUpdate::Wordle.statement(&missing).is_err());

        let mut ids = ids();
        ids.game_ids.insert("connections".to_string(), "REPLACEME".to_string());
        assert!(ScoreUpdate::Connections.statement(&ids).is_err());
        ids.game_ids.insert("connections".to_string(), "g-conn".to_string());
        let sql = ScoreUpdate::Connections.statement(&ids).unwrap();
        assert!(sql.contains("WHEN score = 0 THEN 4\n"));
        assert!(sql.ends_with("WHERE game_id = 'g-conn';\n"));
    }
}
