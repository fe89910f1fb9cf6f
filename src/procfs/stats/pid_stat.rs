//! Parser for the process accounting line in `/proc/<pid>/stat` and
//! `/proc/<pid>/task/<tid>/stat`.
//!
//! The line is a list of space separated fields, see
//! [`proc_pid_stat(5)`](https://man7.org/linux/man-pages/man5/proc_pid_stat.5.html):
//!
//! ```text
//! <pid> (<comm>) <state> <ppid> <pgrp> <session> <tty_nr> <tpgid> <flags> <minflt>
//! <cminflt> <majflt> <cmajflt> <utime> <stime> <cutime> <cstime> <priority> <nice>
//! <num_threads> <itrealvalue> <starttime> ...
//! ```
//!
//! The command name may itself contain spaces and unbalanced parentheses, so every
//! field after it is indexed relative to the last `)` of the line.

use super::error::{parse_u64, single_line};
use super::{ProcFile, StatParseError};

/// Number of fields following the command name that must be present.
const FIELDS_AFTER_COMM: usize = 20;

const STATE_IDX: usize = 0;
const MAJFLT_IDX: usize = 9;
const UTIME_IDX: usize = 11;
const STIME_IDX: usize = 12;
const STARTTIME_IDX: usize = 19;

/// The fields of a `stat` line used for resource accounting, in clock ticks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PidStat {
    /// Command name without the enclosing parentheses.
    pub comm: String,
    /// Single character scheduling state, e.g. `R`, `S` or `D`.
    pub state: String,
    /// Major page faults of the process.
    pub major_faults: u64,
    /// User plus kernel mode time in clock ticks.
    pub cpu_time_ticks: u64,
    /// Start time after boot in clock ticks.
    pub start_time_ticks: u64,
}

impl PidStat {
    /// Returns `true` when the task is in uninterruptible sleep, usually blocked on I/O.
    pub fn is_io_blocked(&self) -> bool {
        self.state == "D"
    }

    /// CPU time in milliseconds for the given tick length.
    pub fn cpu_time_millis(&self, millis_per_tick: u64) -> u64 {
        self.cpu_time_ticks.saturating_mul(millis_per_tick)
    }

    /// Start time in milliseconds since boot for the given tick length.
    pub fn start_time_millis(&self, millis_per_tick: u64) -> u64 {
        self.start_time_ticks.saturating_mul(millis_per_tick)
    }
}

/// Splits the line after the pid into the command name and the remaining fields.
///
/// The name runs from the opening parenthesis to the last `)` of the line. No later
/// field can contain a parenthesis, so any name the kernel reports is accepted.
fn split_comm(after_pid: &str) -> Result<(&str, Vec<&str>), StatParseError> {
    let close = after_pid
        .rfind(')')
        .filter(|_| after_pid.starts_with('('))
        .ok_or_else(|| StatParseError::UnterminatedComm(after_pid.to_owned()))?;

    let comm = &after_pid[1..close];
    let rest = after_pid[close + 1..].trim_start_matches(' ');
    let fields = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(' ').collect()
    };
    Ok((comm, fields))
}

impl ProcFile for PidStat {
    fn parse(content: &str) -> Result<Self, StatParseError> {
        let line = single_line(content)?;
        let (_pid, after_pid) = line.split_once(' ').unwrap_or((line, ""));

        let (comm, rest) = split_comm(after_pid)?;
        if rest.len() < FIELDS_AFTER_COMM {
            return Err(StatParseError::MissingFields {
                expected: 2 + FIELDS_AFTER_COMM,
                found: 2 + rest.len(),
            });
        }

        let major_faults = parse_u64("majflt", rest[MAJFLT_IDX])?;
        let utime = parse_u64("utime", rest[UTIME_IDX])?;
        let stime = parse_u64("stime", rest[STIME_IDX])?;
        let start_time_ticks = parse_u64("starttime", rest[STARTTIME_IDX])?;

        Ok(PidStat {
            comm: comm.to_owned(),
            state: rest[STATE_IDX].to_owned(),
            major_faults,
            cpu_time_ticks: utime.saturating_add(stime),
            start_time_ticks,
        })
    }
}
