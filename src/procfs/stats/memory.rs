//! This module provides parsers for the two per-process memory summaries.
//!
//! - **`/proc/<pid>/smaps_rollup`** (Linux >= 4.14): the kernel pre-aggregates all
//!   mappings, so resident, proportional, unique and swapped sizes are read directly.
//!   Lines look like `Rss:   1234 kB`; the header line and unknown keys are ignored.
//!
//! - **`/proc/<pid>/statm`**: a single line of page counts,
//!   `<size> <resident> <shared> <text> <lib> <data> <dt>`. Only resident and shared
//!   pages are used and the unique set is approximated as `resident - shared`.
//!
//! # Examples
//!
//! ```rust
//! use uidstat_monitor::procfs::stats::{ProcFile, SmapsRollup, Statm};
//!
//! let rollup = SmapsRollup::parse("Rss: 100 kB\nPss: 60 kB\nPrivate_Dirty: 40 kB\n").unwrap();
//! assert_eq!(rollup.uss_kb(), 40);
//!
//! let statm = Statm::parse("2969783 1481 938 530 0 5067 0\n").unwrap();
//! assert_eq!(statm.rss_kb(4), 5924);
//! assert_eq!(statm.uss_kb(4), 2172);
//! ```

use super::error::{parse_u64, single_line};
use super::{ProcFile, StatParseError};

/// Memory summary from `smaps_rollup`, all values in KB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmapsRollup {
    pub rss_kb: u64,
    pub pss_kb: u64,
    pub shared_clean_kb: u64,
    pub shared_dirty_kb: u64,
    pub private_clean_kb: u64,
    pub private_dirty_kb: u64,
    pub swap_pss_kb: u64,
}

impl SmapsRollup {
    /// Unique set size: memory mapped only by this process.
    pub fn uss_kb(&self) -> u64 {
        self.private_clean_kb.saturating_add(self.private_dirty_kb)
    }

    pub fn shared_kb(&self) -> u64 {
        self.shared_clean_kb.saturating_add(self.shared_dirty_kb)
    }

    /// A rollup is only trusted when it reports non-zero resident, proportional and
    /// unique sizes. Kernel threads and zombies report all zeros.
    pub fn is_populated(&self) -> bool {
        self.rss_kb > 0 && self.pss_kb > 0 && self.uss_kb() > 0
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut u64> {
        match key {
            "Rss" => Some(&mut self.rss_kb),
            "Pss" => Some(&mut self.pss_kb),
            "Shared_Clean" => Some(&mut self.shared_clean_kb),
            "Shared_Dirty" => Some(&mut self.shared_dirty_kb),
            "Private_Clean" => Some(&mut self.private_clean_kb),
            "Private_Dirty" => Some(&mut self.private_dirty_kb),
            "SwapPss" => Some(&mut self.swap_pss_kb),
            _ => None,
        }
    }
}

impl ProcFile for SmapsRollup {
    fn parse(content: &str) -> Result<Self, StatParseError> {
        let mut rollup = SmapsRollup::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let Some(field) = rollup.field_mut(key) else {
                continue;
            };
            let value = value.split_whitespace().next().unwrap_or_default();
            *field = field.saturating_add(parse_u64(key, value)?);
        }

        Ok(rollup)
    }
}

/// Page counts from `statm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statm {
    pub resident_pages: u64,
    pub shared_pages: u64,
}

const STATM_MIN_FIELDS: usize = 6;

impl Statm {
    pub fn rss_kb(&self, page_size_kb: u64) -> u64 {
        self.resident_pages.saturating_mul(page_size_kb)
    }

    pub fn shared_kb(&self, page_size_kb: u64) -> u64 {
        self.shared_pages.saturating_mul(page_size_kb)
    }

    /// Resident minus shared memory, clamped to zero.
    pub fn uss_kb(&self, page_size_kb: u64) -> u64 {
        self.rss_kb(page_size_kb)
            .saturating_sub(self.shared_kb(page_size_kb))
    }
}

impl ProcFile for Statm {
    fn parse(content: &str) -> Result<Self, StatParseError> {
        let line = single_line(content)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < STATM_MIN_FIELDS {
            return Err(StatParseError::MissingFields {
                expected: STATM_MIN_FIELDS,
                found: fields.len(),
            });
        }

        Ok(Statm {
            resident_pages: parse_u64("resident", fields[1])?,
            shared_pages: parse_u64("shared", fields[2])?,
        })
    }
}
