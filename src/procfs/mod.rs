//! Per-uid process resource accounting built from the Linux process table.
//!
//! This module walks `/proc` (or any directory laid out like it), reads the accounting
//! files of every thread group leader and its threads, and aggregates the results by
//! the uid owning each process. Every collection pass also produces the difference
//! against the previous pass.
//!
//! # Features
//!
//! - CPU time, major page faults and task counts from `stat`.
//! - CPU cycles per thread from `time_in_state`, when the kernel exposes it.
//! - RSS, PSS, USS and swap PSS from `smaps_rollup`, falling back to `statm`.
//! - Processes that exit mid-scan are skipped; malformed files abort the pass.
//!
//! # Key Components
//!
//! - [`UidProcStatsCollector`]: probes the available files and runs collection passes.
//! - [`UidProcStats`] and [`ProcessStats`]: the aggregated records.
//! - [`stats`]: parsers for the individual procfs files.
//!
//! # Platform Requirements
//!
//! - Read access to `/proc/<pid>/{stat,status,statm}` and `/proc/<pid>/task`.
mod collector;
mod delta;
mod error;
mod model;
mod paths;
mod reader;
mod scanner;
pub mod stats;
mod sysconf;
#[cfg(test)]
mod testutil;

pub use collector::{CollectorOptions, UidProcStatsCollector, smaps_rollup_supported};
pub use delta::{compute_delta, process_delta};
pub use error::{CollectError, ReadError, SkipReason};
pub use model::{ProcessStats, Snapshot, UidProcStats};
pub use paths::ProcPaths;
pub use sysconf::SystemClock;
