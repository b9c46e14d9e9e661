use crate::model::{Outcome, RunMetrics};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

const PATTERN_WIDTH: usize = 20;
const GENERATIONS_WIDTH: usize = 20;
const POPULATION_WIDTH: usize = 15;
const TIME_TAKEN_WIDTH: usize = 15;

/// Width of the dashed line under the column labels
pub const SEPARATOR_WIDTH: usize = 70;

pub fn write_header<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "{}",
        format_columns(
            "Patternname",
            "totalGenerations",
            "PeakPopulation",
            "Timetaken(ms)"
        )
    )?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))
}

/// Write the line for a processed run. Skipped runs produce no output.
pub fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Success(metrics) => writeln!(out, "{}", format_metrics_row(metrics)),
        Outcome::Skip => Ok(()),
        Outcome::Failure { path, error } => writeln!(out, "{}", format_error_line(path, error)),
    }
}

pub fn format_metrics_row(metrics: &RunMetrics) -> String {
    format_columns(
        &metrics.pattern_name,
        metrics.total_generations,
        metrics.peak_population,
        metrics.time_taken_ms,
    )
}

pub fn format_error_line(path: &Path, error: &impl Display) -> String {
    format!("Error processing file {}: {}", path.display(), error)
}

fn format_columns(
    pattern: impl Display,
    generations: impl Display,
    population: impl Display,
    time_taken: impl Display,
) -> String {
    format!(
        "{:<PATTERN_WIDTH$} {:<GENERATIONS_WIDTH$} {:<POPULATION_WIDTH$} {:<TIME_TAKEN_WIDTH$}",
        pattern.to_string(),
        generations.to_string(),
        population.to_string(),
        time_taken.to_string(),
    )
}
