use crate::frame::ParsedRun;
use crate::model::RunMetrics;
use chrono::NaiveDateTime;
use polars::prelude::StringChunked;
use thiserror::Error;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const GENERATION_COLUMN: &str = "Generation";
pub const POPULATION_COLUMN: &str = "Population Size";

/// Run log timestamps are UTC with microsecond precision, e.g. `2024-03-01T12:00:00.026490Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
/// The seconds fraction is mandatory and has at most microsecond precision
const MAX_FRACTION_DIGITS: usize = 6;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Required column missing: `{column}`")]
    MissingColumn { column: &'static str },
    #[error("Invalid generation value: `{value}`")]
    InvalidGeneration { value: String },
    #[error("Invalid population value on row {row}: `{value}`")]
    InvalidPopulation { row: usize, value: String },
    #[error("Invalid timestamp format: `{value}`")]
    InvalidTimestamp { value: String },
}

/// Derive the summary metrics for one run.
///
/// Any value that cannot be converted fails the whole run, there is no partial result.
pub fn extract_metrics(pattern_name: &str, run: &ParsedRun) -> Result<RunMetrics, ExtractError> {
    let timestamps = required_column(run, TIMESTAMP_COLUMN)?;
    let generations = required_column(run, GENERATION_COLUMN)?;
    let populations = required_column(run, POPULATION_COLUMN)?;

    let last_row = run.row_count().saturating_sub(1);

    let last_generation = raw_value(generations, last_row);
    let total_generations =
        parse_integer(last_generation).ok_or_else(|| ExtractError::InvalidGeneration {
            value: last_generation.to_string(),
        })?;

    let peak_population = peak_population(populations)?;

    let started_at = parse_timestamp(raw_value(timestamps, 0))?;
    let finished_at = parse_timestamp(raw_value(timestamps, last_row))?;

    Ok(RunMetrics {
        pattern_name: pattern_name.to_string(),
        total_generations,
        peak_population,
        time_taken_ms: elapsed_ms(started_at, finished_at),
    })
}

fn required_column<'a>(
    run: &'a ParsedRun,
    column: &'static str,
) -> Result<&'a StringChunked, ExtractError> {
    run.column(column).ok_or(ExtractError::MissingColumn { column })
}

/// Null fields, from short rows or empty values, read as an empty string
fn raw_value(values: &StringChunked, row: usize) -> &str {
    values.get(row).unwrap_or_default()
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn peak_population(populations: &StringChunked) -> Result<i64, ExtractError> {
    let mut peak = None;
    for (idx, value) in populations.into_iter().enumerate() {
        let value = value.unwrap_or_default();
        let population = parse_integer(value).ok_or_else(|| ExtractError::InvalidPopulation {
            row: idx + 1,
            value: value.to_string(),
        })?;

        peak = Some(peak.map_or(population, |p: i64| p.max(population)));
    }

    peak.ok_or_else(|| ExtractError::InvalidPopulation {
        row: 0,
        value: String::new(),
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ExtractError> {
    let invalid = || ExtractError::InvalidTimestamp {
        value: value.to_string(),
    };

    if !has_valid_fraction(value) {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| {
        log::debug!("Failed to parse timestamp `{value}`: {e}");
        invalid()
    })
}

/// chrono's `%.f` accepts a missing fraction and up to nine digits, so check the `.ffffffZ`
/// suffix separately.
fn has_valid_fraction(value: &str) -> bool {
    value
        .strip_suffix('Z')
        .and_then(|rest| rest.rsplit_once('.'))
        .map(|(_, fraction)| {
            (1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
                && fraction.bytes().all(|b| b.is_ascii_digit())
        })
        .unwrap_or(false)
}

/// Whole milliseconds from `start` to `end`, truncated toward zero
fn elapsed_ms(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    end.signed_duration_since(start).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::parse_run;

    fn run(rows: &[&str]) -> ParsedRun {
        let mut content = String::from("Timestamp,Generation,Population Size\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        parse_run(&content).expect("failed to parse test run")
    }

    #[test]
    fn test_extract_metrics() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "glider",
            &run(&[
                "2024-01-01T00:00:00.000000Z,118,5",
                "2024-01-01T00:00:00.250000Z,119,4",
                "2024-01-01T00:00:00.500000Z,120,5",
            ]),
        )?;

        assert_eq!(
            metrics,
            RunMetrics {
                pattern_name: "glider".to_string(),
                total_generations: 120,
                peak_population: 5,
                time_taken_ms: 500,
            }
        );

        Ok(())
    }

    #[test]
    fn test_total_generations_is_last_row_not_max() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "reset",
            &run(&[
                "2024-01-01T00:00:00.000000Z,50,1",
                "2024-01-01T00:00:00.000000Z,7,1",
            ]),
        )?;
        assert_eq!(metrics.total_generations, 7);
        Ok(())
    }

    #[test]
    fn test_peak_population_grows_with_larger_row() -> anyhow::Result<()> {
        let mut rows = vec![
            "2024-01-01T00:00:00.000000Z,1,12",
            "2024-01-01T00:00:00.100000Z,2,30",
            "2024-01-01T00:00:00.200000Z,3,8",
        ];
        let before = extract_metrics("acorn", &run(&rows))?;
        assert_eq!(before.peak_population, 30);

        rows.push("2024-01-01T00:00:00.300000Z,4,31");
        let after = extract_metrics("acorn", &run(&rows))?;
        assert_eq!(after.peak_population, 31);

        Ok(())
    }

    #[test]
    fn test_columns_are_found_by_name() -> anyhow::Result<()> {
        let parsed = parse_run(
            "Population Size,Extra,Generation,Timestamp\n9,x,3,2024-01-01T00:00:01.000000Z\n",
        )?;
        let metrics = extract_metrics("block", &parsed)?;
        assert_eq!(metrics.total_generations, 3);
        assert_eq!(metrics.peak_population, 9);
        assert_eq!(metrics.time_taken_ms, 0);
        Ok(())
    }

    #[test]
    fn test_identical_timestamps_take_no_time() -> anyhow::Result<()> {
        let metrics = extract_metrics("blinker", &run(&["2024-01-01T00:00:00.123456Z,1,2"]))?;
        assert_eq!(metrics.time_taken_ms, 0);
        Ok(())
    }

    #[test]
    fn test_one_second_is_1000_ms() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "beacon",
            &run(&[
                "2024-01-01T23:59:59.900000Z,1,6",
                "2024-01-02T00:00:00.900000Z,2,8",
            ]),
        )?;
        assert_eq!(metrics.time_taken_ms, 1000);
        Ok(())
    }

    #[test]
    fn test_sub_millisecond_remainder_is_truncated() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "toad",
            &run(&[
                "2024-01-01T00:00:00.000000Z,1,6",
                "2024-01-01T00:00:00.001999Z,2,6",
            ]),
        )?;
        assert_eq!(metrics.time_taken_ms, 1);
        Ok(())
    }

    #[test]
    fn test_out_of_order_timestamps_are_negative() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "pulsar",
            &run(&[
                "2024-01-01T00:00:01.000000Z,1,48",
                "2024-01-01T00:00:00.499500Z,2,56",
            ]),
        )?;
        // -500.5ms truncates toward zero
        assert_eq!(metrics.time_taken_ms, -500);
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let parsed = parse_run("Timestamp,Generation\n2024-01-01T00:00:00.000000Z,1\n")
            .expect("failed to parse test run");
        let result = extract_metrics("block", &parsed);
        assert!(matches!(
            result,
            Err(ExtractError::MissingColumn {
                column: POPULATION_COLUMN
            })
        ));
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let parsed = parse_run(
            "timestamp,Generation,Population Size\n2024-01-01T00:00:00.000000Z,1,2\n",
        )
        .expect("failed to parse test run");
        let result = extract_metrics("block", &parsed);
        assert!(matches!(
            result,
            Err(ExtractError::MissingColumn {
                column: TIMESTAMP_COLUMN
            })
        ));
    }

    #[test]
    fn test_invalid_generation() {
        let result = extract_metrics(
            "glider",
            &run(&[
                "2024-01-01T00:00:00.000000Z,1,5",
                "2024-01-01T00:00:00.100000Z,abc,5",
            ]),
        );
        assert!(matches!(
            result,
            Err(ExtractError::InvalidGeneration { value }) if value == "abc"
        ));
    }

    #[test]
    fn test_any_invalid_population_fails_the_run() {
        let result = extract_metrics(
            "glider",
            &run(&[
                "2024-01-01T00:00:00.000000Z,1,5",
                "2024-01-01T00:00:00.100000Z,2,many",
                "2024-01-01T00:00:00.200000Z,3,5",
            ]),
        );
        assert!(matches!(
            result,
            Err(ExtractError::InvalidPopulation { row: 2, value }) if value == "many"
        ));
    }

    #[test]
    fn test_integer_whitespace_is_tolerated() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "glider",
            &run(&["2024-01-01T00:00:00.000000Z, 4 ,\" 9\""]),
        )?;
        assert_eq!(metrics.total_generations, 4);
        assert_eq!(metrics.peak_population, 9);
        Ok(())
    }

    #[test]
    fn test_short_fraction_is_left_aligned() -> anyhow::Result<()> {
        let metrics = extract_metrics(
            "glider",
            &run(&["2024-01-01T00:00:00.5Z,1,5", "2024-01-01T00:00:01.75Z,2,5"]),
        )?;
        assert_eq!(metrics.time_taken_ms, 1250);
        Ok(())
    }

    #[test]
    fn test_invalid_timestamp_format() {
        for timestamp in [
            "2024-01-01 00:00:00.000000",
            "2024-01-01T00:00:00.000000+01:00",
            "2024-01-01T00:00:00Z",
            "2024-01-01T00:00:00.Z",
            "2024-01-01T00:00:00.123456789Z",
            "2024-01-01T00:00:00.12a456Z",
            "yesterday",
        ] {
            let result = extract_metrics("glider", &run(&[&format!("{timestamp},1,5")]));
            assert!(
                matches!(&result, Err(ExtractError::InvalidTimestamp { value, .. }) if value == timestamp),
                "Expected invalid timestamp for {timestamp}, got {result:?}"
            );
        }
    }
}
