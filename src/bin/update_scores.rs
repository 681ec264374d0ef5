//! Update Scores - Convert already-stored scores to the database encoding
//!
//! Emits a single UPDATE for one game that applies the same conversion the
//! backfill applies to sheet values, scoped to that game's id.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use league_backfill::ids::IdMapping;
use league_backfill::sql::ScoreUpdate;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "update-scores")]
#[command(about = "Generate SQL converting stored scores from the spreadsheet encoding")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Wordle scores from remaining slots (0-5, -1 fail) to guesses (1-6, 7 fail)
    Wordle {
        /// JSON file with game_ids (must have a 'wordle' key)
        #[arg(long)]
        ids: PathBuf,

        /// Write SQL to file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert Connections scores from (5 - mistakes) to mistakes (0-4, fail 4)
    Connections {
        /// JSON file with game_ids (must have a 'connections' key)
        #[arg(long)]
        ids: PathBuf,

        /// Write SQL to file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Wordle { ids, output } => {
            write_update(ScoreUpdate::Wordle, &ids, output.as_deref())?;
        }
        Commands::Connections { ids, output } => {
            write_update(ScoreUpdate::Connections, &ids, output.as_deref())?;
        }
    }

    Ok(())
}

fn write_update(update: ScoreUpdate, ids_path: &Path, output: Option<&Path>) -> Result<()> {
    if !ids_path.exists() {
        anyhow::bail!("Ids file not found: {}", ids_path.display());
    }
    let ids = IdMapping::load(ids_path)?;
    let sql = update.statement(&ids)?;

    match output {
        Some(path) => {
            std::fs::write(path, &sql)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote SQL to {}. Run it against your DB to update existing {} scores.",
                path.display(),
                update.slug()
            );
        }
        None => println!("{}", sql),
    }
    Ok(())
}
