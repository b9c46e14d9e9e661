use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// The simulator may write the path of the log as the first line, prefixed with this marker.
const COMMENT_PREFIX: &str = "//";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {source}")]
    Unreadable {
        #[source]
        source: std::io::Error,
    },
    #[error("No header row found")]
    MissingHeader,
    #[error("Malformed CSV: {source}")]
    Malformed {
        #[source]
        source: PolarsError,
    },
    /// Not a failure, the file has a header but no rows to summarise
    #[error("No data rows")]
    NoData,
}

/// The tabular content of one run log.
///
/// Every field is kept as the raw string from the file, conversion happens during metrics
/// extraction.
#[derive(Debug, Clone)]
pub struct ParsedRun {
    frame: DataFrame,
}

impl ParsedRun {
    pub(crate) fn headers(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    /// The raw values of a column, or `None` if there is no column with exactly this name
    pub fn column(&self, name: &str) -> Option<&StringChunked> {
        self.frame.column(name).ok().and_then(|c| c.str().ok())
    }
}

pub fn load_run_file(path: &Path) -> Result<ParsedRun, ParseError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ParseError::Unreadable { source })?;

    parse_run(&content)
}

pub fn parse_run(content: &str) -> Result<ParsedRun, ParseError> {
    let table = strip_comment_line(content);
    if table.trim().is_empty() {
        return Err(ParseError::MissingHeader);
    }

    // A zero length schema inference reads every column as a string
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(table.as_bytes().to_vec()))
        .finish()
        .map_err(|source| ParseError::Malformed { source })?;

    if frame.height() == 0 {
        return Err(ParseError::NoData);
    }

    Ok(ParsedRun { frame })
}

/// Drop the first line if it is a comment, the rest of the content is left untouched.
fn strip_comment_line(content: &str) -> &str {
    let first_line_end = content
        .find('\n')
        .map(|idx| idx + 1)
        .unwrap_or(content.len());

    if content[..first_line_end].trim().starts_with(COMMENT_PREFIX) {
        &content[first_line_end..]
    } else {
        content
    }
}
