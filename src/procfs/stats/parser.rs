//! Provides the generic parsing abstractions shared by the procfs file parsers.
//!
//! # Traits and types
//!
//! - [`ProcFile`]: A trait for types that can be parsed from the full contents of one
//!   procfs file, e.g. `/proc/<pid>/stat` or `/proc/<pid>/statm`.
//! - [`KeyValueParser`]: A parser for `key<delimiter>value` files such as
//!   `/proc/<pid>/status`, restricted to a fixed set of tags.
//!
//! # Example: Using `KeyValueParser`
//!
//! ```rust
//! use uidstat_monitor::procfs::stats::KeyValueParser;
//!
//! const PARSER: KeyValueParser = KeyValueParser::new(":\t", &["Name", "Pid"]);
//!
//! let values = PARSER.parse("Name:\tinit\nUmask:\t0022\nPid:\t1\n").unwrap();
//! assert_eq!(values["Name"], "init");
//! assert_eq!(values["Pid"], "1");
//! assert!(!values.contains_key("Umask"));
//! ```

use std::collections::HashMap;

use super::StatParseError;

/// A type that can be parsed from the in-memory contents of a single procfs file.
///
/// Implementations must only report grammar violations. Whether a file could be
/// read at all is decided by the caller that loaded `content`.
pub trait ProcFile: Sized {
    /// Parses the full contents of the file.
    ///
    /// # Errors
    ///
    /// Returns a [`StatParseError`] if `content` does not follow the expected format.
    fn parse(content: &str) -> Result<Self, StatParseError>;
}

/// Parses `key<delimiter>value` files, keeping only the requested tags.
#[derive(Debug, Clone, Copy)]
pub struct KeyValueParser {
    delimiter: &'static str,
    tags: &'static [&'static str],
}

impl KeyValueParser {
    /// Creates a parser splitting on `delimiter` and keeping only `tags`.
    pub const fn new(delimiter: &'static str, tags: &'static [&'static str]) -> Self {
        Self { delimiter, tags }
    }

    /// Parses `content` into a map from tag to its trimmed raw value.
    ///
    /// Lines whose key is not one of the requested tags are ignored.
    ///
    /// # Errors
    ///
    /// - [`StatParseError::DuplicateField`] if a tag appears on more than one line.
    /// - [`StatParseError::MissingDelimiter`] if a line starting with a tag does not
    ///   contain the delimiter.
    pub fn parse(&self, content: &str) -> Result<HashMap<&'static str, String>, StatParseError> {
        let mut values = HashMap::with_capacity(self.tags.len());

        for (idx, line) in content.lines().enumerate() {
            let lineno = idx + 1;
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(self.delimiter) else {
                if self.tags.iter().any(|tag| line.starts_with(tag)) {
                    return Err(StatParseError::MissingDelimiter {
                        line: lineno,
                        delimiter: self.delimiter,
                        content: line.to_owned(),
                    });
                }
                continue;
            };
            let Some(tag) = self.tags.iter().find(|tag| **tag == key) else {
                continue;
            };
            if values.insert(*tag, value.trim().to_owned()).is_some() {
                return Err(StatParseError::DuplicateField {
                    field: key.to_owned(),
                    line: lineno,
                });
            }
        }

        Ok(values)
    }
}
