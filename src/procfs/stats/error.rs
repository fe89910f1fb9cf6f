//! Defines structured error types for parsing procfs files.
//!
//! A [`StatParseError`] always means the file was read but its contents violate
//! the expected grammar. Failing to read a file at all is not a parse error and
//! is reported by the reader layer instead.
//!
//! # Example
//!
//! ```rust
//! use uidstat_monitor::procfs::stats::{ProcFile, PidStat, StatParseError};
//!
//! let err = PidStat::parse("1 init S 0").unwrap_err();
//! assert!(matches!(err, StatParseError::UnterminatedComm(_)));
//! ```

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("file is empty")]
    Empty,

    #[error("expected a single line, found {lines}")]
    UnexpectedLineCount { lines: usize },

    #[error("command name `{0}` is not enclosed in parentheses")]
    UnterminatedComm(String),

    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': '{value}': {source}")]
    InvalidValue {
        field: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("line {line} is missing the delimiter `{delimiter}`: '{content}'")]
    MissingDelimiter {
        line: usize,
        delimiter: &'static str,
        content: String,
    },
}

impl StatParseError {
    /// Builds an [`StatParseError::InvalidValue`] for a field that failed to parse.
    pub(crate) fn invalid_value(
        field: impl Into<String>,
        value: &str,
        source: ParseIntError,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_owned(),
            source,
        }
    }
}

/// Parses `value` as a `u64`, naming `field` in the error.
pub(crate) fn parse_u64(field: &str, value: &str) -> Result<u64, StatParseError> {
    value
        .parse::<u64>()
        .map_err(|source| StatParseError::invalid_value(field, value, source))
}

/// Parses `value` as a `u32`, naming `field` in the error.
pub(crate) fn parse_u32(field: &str, value: &str) -> Result<u32, StatParseError> {
    value
        .parse::<u32>()
        .map_err(|source| StatParseError::invalid_value(field, value, source))
}

/// Splits `content` into its single line, tolerating one trailing newline.
pub(crate) fn single_line(content: &str) -> Result<&str, StatParseError> {
    let line = content.strip_suffix('\n').unwrap_or(content);
    if line.is_empty() {
        return Err(StatParseError::Empty);
    }
    let lines = line.split('\n').count();
    if lines != 1 {
        return Err(StatParseError::UnexpectedLineCount { lines });
    }
    Ok(line)
}
