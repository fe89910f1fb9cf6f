//! Parser for per-thread CPU frequency accounting in `/proc/<pid>/task/<tid>/time_in_state`.
//!
//! ```text
//! cpu0
//! <freq kHz> <time at freq in clock ticks>
//! <freq kHz> <time at freq in clock ticks>
//! cpu4
//! <freq kHz> <time at freq in clock ticks>
//! ```
//!
//! Each `cpuX` header starts the block of one frequency policy. A thread only runs on
//! one core at a time, so the blocks are summed without double counting.
//!
//! The file is only populated when the kernel is built with `CPU_FREQ_TIMES` (or an
//! equivalent) and the governor reports transitions; otherwise it may be empty.

use super::error::parse_u64;
use super::{ProcFile, StatParseError};

/// Accumulated `freq_kHz * ticks` over all frequency blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeInState {
    pub khz_ticks: u64,
}

impl TimeInState {
    /// Converts the accumulated kHz-ticks into CPU cycles.
    ///
    /// `cycles_per_khz_tick` is `1000 / CLK_TCK`: kHz to Hz scales by 1000 and a tick
    /// lasts `1 / CLK_TCK` seconds.
    pub fn cpu_cycles(&self, cycles_per_khz_tick: u64) -> u64 {
        self.khz_ticks.saturating_mul(cycles_per_khz_tick)
    }
}

impl ProcFile for TimeInState {
    fn parse(content: &str) -> Result<Self, StatParseError> {
        let mut khz_ticks: u64 = 0;

        for line in content.lines() {
            if line.is_empty() || line.starts_with("cpu") {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(freq), Some(ticks)) = (parts.next(), parts.next()) else {
                return Err(StatParseError::MissingFields {
                    expected: 2,
                    found: line.split_whitespace().count(),
                });
            };
            let freq = parse_u64("freq_khz", freq)?;
            let ticks = parse_u64("clock_ticks", ticks)?;
            khz_ticks = khz_ticks.saturating_add(freq.saturating_mul(ticks));
        }

        Ok(TimeInState { khz_ticks })
    }
}
