use crate::analyze::{extract_metrics, ExtractError};
use crate::discover::{discover_run_files, RUN_LOG_EXTENSION};
use crate::frame::{load_run_file, ParseError};
use crate::model::{Outcome, RunFile};
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub mod analyze;
pub mod discover;
pub mod frame;
pub mod model;
pub mod report;

/// Default location of the run logs, relative to the working directory
pub const DEFAULT_RESULTS_DIR: &str = "./results";

/// Why a single run log could not be summarised
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Counts of how each run log in a batch was handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub summarised: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchTally {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Success(_) => self.summarised += 1,
            Outcome::Skip => self.skipped += 1,
            Outcome::Failure { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.summarised + self.skipped + self.failed
    }
}

/// Parse one run log and derive its metrics.
///
/// Errors are captured in the returned [Outcome] so that one bad log does not stop the rest of
/// the batch from being reported.
pub fn process_run_file(run_file: &RunFile) -> Outcome {
    let result = load_run_file(&run_file.path)
        .map_err(ProcessError::from)
        .and_then(|run| {
            log::debug!(
                "Loaded {} rows from {} with columns {:?}",
                run.row_count(),
                run_file.path.display(),
                run.headers()
            );
            extract_metrics(&run_file.pattern_name, &run).map_err(ProcessError::from)
        });

    match result {
        Ok(metrics) => {
            log::debug!("Summarised {}: {metrics:?}", run_file.path.display());
            Outcome::Success(metrics)
        }
        Err(ProcessError::Parse(ParseError::NoData)) => {
            log::info!("Skipping {}, no data rows", run_file.path.display());
            Outcome::Skip
        }
        Err(error) => {
            log::warn!("Failed to summarise {}: {error}", run_file.path.display());
            Outcome::Failure {
                path: run_file.path.clone(),
                error,
            }
        }
    }
}

/// Write the report table for the given run logs, in the order they are given.
pub fn write_report<W: Write>(out: &mut W, run_files: &[RunFile]) -> anyhow::Result<BatchTally> {
    report::write_header(out).context("Write report header")?;

    let mut tally = BatchTally::default();
    for run_file in run_files {
        let outcome = process_run_file(run_file);
        report::write_outcome(out, &outcome)
            .with_context(|| format!("Write report line for {}", run_file.path.display()))?;
        tally.record(&outcome);
    }

    out.flush().context("Flush report")?;

    Ok(tally)
}

/// Discover every run log in `results_dir` and write the report table for them.
pub fn summarise_directory<W: Write>(
    results_dir: &Path,
    out: &mut W,
) -> anyhow::Result<BatchTally> {
    log::info!("Summarising run logs in {}", results_dir.display());

    let run_files = discover_run_files(results_dir, RUN_LOG_EXTENSION)?;
    log::debug!("Found {} run logs", run_files.len());

    let tally = write_report(out, &run_files)?;

    if tally.failed > 0 {
        log::warn!(
            "{} out of {} run logs failed to summarise",
            tally.failed,
            tally.total()
        );
    }
    if tally.skipped > 0 {
        log::info!("{} run logs had no data and were skipped", tally.skipped);
    }

    Ok(tally)
}
