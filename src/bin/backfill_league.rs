//! Backfill League - Recover raw league scores from spreadsheet CSV exports
//!
//! Parses one or more league sheets, reverses crossword handicaps and the
//! sheet's score encodings, collects the daily starting words, and emits the
//! result as JSON or as SQL INSERT statements.

use anyhow::{Context, Result};
use clap::Parser;
use league_backfill::config::LeagueConfig;
use league_backfill::ids::IdMapping;
use league_backfill::pipeline::{run_batch, BatchConfig};
use league_backfill::sql::backfill_statements;
use league_backfill::DuplicatePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "backfill-league")]
#[command(about = "Parse league CSV and output backfill data")]
struct Cli {
    /// CSV file(s), processed in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit SQL INSERTs (requires --ids)
    #[arg(long)]
    sql: bool,

    /// JSON file: user_ids, game_ids (by slug), league_id, optional
    /// league_games (slug -> start_date/end_date)
    #[arg(long)]
    ids: Option<PathBuf>,

    /// Write output to file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit SQL even when ids look like placeholders (YOUR_*, REPLACE_*).
    /// Use for a find-replace workflow.
    #[arg(long)]
    allow_placeholders: bool,

    /// Keep first occurrence when the same (player, game, date) appears in
    /// multiple CSVs; warn instead of failing.
    #[arg(long)]
    deduplicate: bool,

    /// JSON league config overriding the built-in roster and game table
    #[arg(long, env = "LEAGUE_BACKFILL_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let league = match &cli.config {
        Some(path) => LeagueConfig::load(path)?,
        None => LeagueConfig::default(),
    };
    let batch_config = BatchConfig {
        league,
        duplicates: if cli.deduplicate {
            DuplicatePolicy::KeepFirst
        } else {
            DuplicatePolicy::Reject
        },
    };

    let backfill = run_batch(&cli.files, &batch_config)?;

    let out = if cli.sql {
        let ids = match &cli.ids {
            Some(path) => IdMapping::load(path)?,
            None => IdMapping::default(),
        };
        let batch = backfill_statements(&backfill, &ids, cli.allow_placeholders)?;
        if batch.statements.is_empty() {
            eprintln!("No INSERTs generated, the SQL output will be empty.");
            eprintln!(
                "Rows are skipped when user_id/game_id/league_id look like placeholders (YOUR_* or REPLACE_*)."
            );
            eprintln!("Put your real ids in the JSON file passed to --ids and run again.");
        } else {
            let dest = cli
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string());
            eprintln!(
                "Wrote {} statement(s) ({} score INSERTs) to {}.",
                batch.statements.len(),
                batch.score_inserts,
                dest
            );
            if cli.output.is_some() {
                eprintln!(
                    "If the SQL fails with 'duplicate key ... scores_user_game_date_unique', the DB already has those rows (e.g. from a previous run)."
                );
            }
        }
        batch.to_sql()
    } else {
        serde_json::to_string_pretty(&backfill).context("Failed to serialize backfill")?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, out)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", out),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "backfill-league",
            "--sql",
            "--ids",
            "ids.json",
            "--deduplicate",
            "-o",
            "backfill.sql",
            "a.csv",
            "b.csv",
        ])
        .unwrap();
        assert!(cli.sql);
        assert!(cli.deduplicate);
        assert!(!cli.allow_placeholders);
        assert_eq!(cli.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(cli.output, Some(PathBuf::from("backfill.sql")));
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["backfill-league", "--sql"]).is_err());
    }
}
