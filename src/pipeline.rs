//! Batch driver shared by the binaries.
//!
//! Files are processed in the order given. A path that does not exist is
//! skipped with a warning; any other failure stops the whole batch.

use std::path::Path;

use crate::aggregate::{Aggregator, Backfill, DuplicatePolicy};
use crate::config::LeagueConfig;
use crate::error::Result;
use crate::extract::process_file;

/// Settings for one backfill run.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    pub league: LeagueConfig,
    pub duplicates: DuplicatePolicy,
}

/// Extract and merge every sheet in `paths`.
pub fn run_batch<P: AsRef<Path>>(paths: &[P], config: &BatchConfig) -> Result<Backfill> {
    let mut aggregator = Aggregator::new();
    let mut processed = 0;

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Skip (not found): {}", path.display());
            continue;
        }
        aggregator.add(process_file(path, &config.league)?);
        processed += 1;
    }

    log::info!("processed {} of {} file(s)", processed, paths.len());
    aggregator.finish(config.duplicates)
}

