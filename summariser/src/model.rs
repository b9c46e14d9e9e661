use crate::ProcessError;
use std::path::{Path, PathBuf};

/// A run log discovered in the results directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    /// Location of the log on disk
    pub path: PathBuf,
    /// The name of the simulated pattern
    ///
    /// This is the file name with its extension removed, so `results/glider.csv` is the run for
    /// the `glider` pattern.
    pub pattern_name: String,
}

impl RunFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pattern_name = pattern_name_from_path(&path);

        Self { path, pattern_name }
    }
}

fn pattern_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Metrics derived from a single run log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    pub pattern_name: String,
    /// The `Generation` value of the final row
    pub total_generations: i64,
    /// The largest `Population Size` seen across every row
    pub peak_population: i64,
    /// Wall time between the first and last row, in whole milliseconds
    ///
    /// This is not clamped, so it is negative if the log is not in time order.
    pub time_taken_ms: i64,
}

/// The result of pushing one [RunFile] through parsing and metrics extraction
#[derive(Debug)]
pub enum Outcome {
    Success(RunMetrics),
    /// The file had a header but no data rows
    Skip,
    Failure { path: PathBuf, error: ProcessError },
}
