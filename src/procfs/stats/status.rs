//! Parser for the owner and thread group of a process from `/proc/<pid>/status`.
//!
//! Only the following lines are used:
//!
//! ```text
//! Tgid:   <thread group id>
//! Uid:    <real uid>  <effective uid>  <saved set uid>  <filesystem uid>
//! ```

use super::error::parse_u32;
use super::{KeyValueParser, ProcFile, StatParseError};

const UID_TAG: &str = "Uid";
const TGID_TAG: &str = "Tgid";

const STATUS_PARSER: KeyValueParser = KeyValueParser::new(":\t", &[UID_TAG, TGID_TAG]);

/// Owner and thread group of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidStatus {
    /// The first value of the `Uid` line.
    pub uid: u32,
    /// Thread group id; equals the pid only for the thread group leader.
    pub tgid: u32,
}

impl ProcFile for PidStatus {
    fn parse(content: &str) -> Result<Self, StatParseError> {
        let values = STATUS_PARSER.parse(content)?;
        if values.is_empty() {
            return Err(StatParseError::Empty);
        }

        let uid = values
            .get(UID_TAG)
            .ok_or(StatParseError::MissingField(UID_TAG))?;
        let uid = uid
            .split_whitespace()
            .next()
            .ok_or(StatParseError::MissingField(UID_TAG))?;
        let tgid = values
            .get(TGID_TAG)
            .ok_or(StatParseError::MissingField(TGID_TAG))?;

        Ok(PidStatus {
            uid: parse_u32(UID_TAG, uid)?,
            tgid: parse_u32(TGID_TAG, tgid)?,
        })
    }
}
