//! Condensed per-pass summaries of a delta snapshot.

use std::fmt;

use serde::Serialize;

use crate::procfs::{Snapshot, UidProcStats};

/// Usage of one uid during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UidUsage {
    pub uid: u32,
    pub cpu_time_millis: u64,
    pub cpu_cycles: u64,
    pub major_faults: u64,
    pub tasks: u32,
    pub io_blocked_tasks: u32,
    pub rss_kb: u64,
    pub process_count: usize,
}

impl UidUsage {
    fn new(uid: u32, stats: &UidProcStats) -> Self {
        Self {
            uid,
            cpu_time_millis: stats.cpu_time_millis,
            cpu_cycles: stats.cpu_cycles,
            major_faults: stats.total_major_faults,
            tasks: stats.total_tasks_count,
            io_blocked_tasks: stats.io_blocked_tasks_count,
            rss_kb: stats.total_rss_kb,
            process_count: stats.process_stats_by_pid.len(),
        }
    }
}

/// Summary of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub uid_count: usize,
    pub process_count: usize,
    pub cpu_time_millis: u64,
    pub cpu_cycles: u64,
    pub major_faults: u64,
    pub io_blocked_tasks: u32,
    /// Uids with the highest CPU time, busiest first.
    pub top_uids: Vec<UidUsage>,
}

impl PassReport {
    /// Summarizes `delta`, keeping the `top` uids by CPU time.
    ///
    /// Ties are broken by CPU cycles, then by ascending uid.
    pub fn from_delta(delta: &Snapshot, top: usize) -> Self {
        let mut report = PassReport {
            uid_count: delta.len(),
            ..Default::default()
        };
        let mut usages = Vec::with_capacity(delta.len());
        for (uid, stats) in delta {
            report.process_count += stats.process_stats_by_pid.len();
            report.cpu_time_millis = report.cpu_time_millis.saturating_add(stats.cpu_time_millis);
            report.cpu_cycles = report.cpu_cycles.saturating_add(stats.cpu_cycles);
            report.major_faults = report.major_faults.saturating_add(stats.total_major_faults);
            report.io_blocked_tasks = report
                .io_blocked_tasks
                .saturating_add(stats.io_blocked_tasks_count);
            usages.push(UidUsage::new(*uid, stats));
        }

        usages.sort_unstable_by(|a, b| {
            b.cpu_time_millis
                .cmp(&a.cpu_time_millis)
                .then(b.cpu_cycles.cmp(&a.cpu_cycles))
                .then(a.uid.cmp(&b.uid))
        });
        usages.truncate(top);
        report.top_uids = usages;
        report
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uids={} processes={} cpu_time_ms={} cpu_cycles={} major_faults={} io_blocked={}",
            self.uid_count,
            self.process_count,
            self.cpu_time_millis,
            self.cpu_cycles,
            self.major_faults,
            self.io_blocked_tasks
        )?;
        if self.top_uids.is_empty() {
            return Ok(());
        }
        f.write_str(" top=[")?;
        for (idx, usage) in self.top_uids.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}ms", usage.uid, usage.cpu_time_millis)?;
        }
        f.write_str("]")
    }
}
