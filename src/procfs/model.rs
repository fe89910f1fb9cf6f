//! Per-process and per-uid resource usage records.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Per-uid stats of one collection pass, keyed by uid.
pub type Snapshot = HashMap<u32, UidProcStats>;

/// Resource usage of a single process.
///
/// A process instance is identified by its pid together with
/// [`start_time_millis`](Self::start_time_millis); a record with the same pid but a
/// different start time belongs to a different process that reused the pid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub comm: String,
    /// Start time in milliseconds since boot.
    pub start_time_millis: u64,
    pub cpu_time_millis: u64,
    pub total_cpu_cycles: u64,
    pub total_major_faults: u64,
    pub total_tasks_count: u32,
    /// Tasks in uninterruptible sleep, usually waiting on I/O.
    pub io_blocked_tasks_count: u32,
    /// CPU cycles per thread id. Threads without frequency accounting are absent.
    pub cpu_cycles_by_tid: HashMap<u32, u64>,
    pub rss_kb: u64,
    pub shared_kb: u64,
    pub pss_kb: u64,
    pub uss_kb: u64,
    pub swap_pss_kb: u64,
}

/// Resource usage of all processes owned by one uid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UidProcStats {
    pub cpu_time_millis: u64,
    pub cpu_cycles: u64,
    pub total_major_faults: u64,
    pub total_tasks_count: u32,
    pub io_blocked_tasks_count: u32,
    pub total_rss_kb: u64,
    pub total_pss_kb: u64,
    pub process_stats_by_pid: HashMap<u32, ProcessStats>,
}

impl UidProcStats {
    /// Folds a process record into the per-uid totals.
    ///
    /// A pid already present is replaced and its contribution removed first, so the
    /// totals always equal the fold of [`process_stats_by_pid`](Self::process_stats_by_pid).
    pub fn add_process(&mut self, pid: u32, stats: ProcessStats) {
        if let Some(old) = self.process_stats_by_pid.remove(&pid) {
            self.subtract(&old);
        }
        self.cpu_time_millis = self.cpu_time_millis.saturating_add(stats.cpu_time_millis);
        self.cpu_cycles = self.cpu_cycles.saturating_add(stats.total_cpu_cycles);
        self.total_major_faults = self
            .total_major_faults
            .saturating_add(stats.total_major_faults);
        self.total_tasks_count = self
            .total_tasks_count
            .saturating_add(stats.total_tasks_count);
        self.io_blocked_tasks_count = self
            .io_blocked_tasks_count
            .saturating_add(stats.io_blocked_tasks_count);
        self.total_rss_kb = self.total_rss_kb.saturating_add(stats.rss_kb);
        self.total_pss_kb = self.total_pss_kb.saturating_add(stats.pss_kb);
        self.process_stats_by_pid.insert(pid, stats);
    }

    fn subtract(&mut self, stats: &ProcessStats) {
        self.cpu_time_millis = self.cpu_time_millis.saturating_sub(stats.cpu_time_millis);
        self.cpu_cycles = self.cpu_cycles.saturating_sub(stats.total_cpu_cycles);
        self.total_major_faults = self
            .total_major_faults
            .saturating_sub(stats.total_major_faults);
        self.total_tasks_count = self
            .total_tasks_count
            .saturating_sub(stats.total_tasks_count);
        self.io_blocked_tasks_count = self
            .io_blocked_tasks_count
            .saturating_sub(stats.io_blocked_tasks_count);
        self.total_rss_kb = self.total_rss_kb.saturating_sub(stats.rss_kb);
        self.total_pss_kb = self.total_pss_kb.saturating_sub(stats.pss_kb);
    }

    /// Finds the process with `pid` if it is the same instance, i.e. started at
    /// `start_time_millis`.
    pub fn find_instance(&self, pid: u32, start_time_millis: u64) -> Option<&ProcessStats> {
        self.process_stats_by_pid
            .get(&pid)
            .filter(|stats| stats.start_time_millis == start_time_millis)
    }
}

/// Returns the uid owning the process instance `pid` started at `start_time_millis`.
pub fn find_uid_of_instance(snapshot: &Snapshot, pid: u32, start_time_millis: u64) -> Option<u32> {
    snapshot
        .iter()
        .find(|(_, uid_stats)| uid_stats.find_instance(pid, start_time_millis).is_some())
        .map(|(uid, _)| *uid)
}

fn sorted<V>(map: &HashMap<u32, V>) -> Vec<(&u32, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by_key(|(key, _)| **key);
    entries
}

impl fmt::Display for ProcessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{comm: {}, startTimeMillis: {}, cpuTimeMillis: {}, totalCpuCycles: {}, \
             totalMajorFaults: {}, totalTasksCount: {}, ioBlockedTasksCount: {}, cpuCyclesByTid: {{",
            self.comm,
            self.start_time_millis,
            self.cpu_time_millis,
            self.total_cpu_cycles,
            self.total_major_faults,
            self.total_tasks_count,
            self.io_blocked_tasks_count,
        )?;
        for (idx, (tid, cycles)) in sorted(&self.cpu_cycles_by_tid).into_iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{{tid: {tid}, cpuCycles: {cycles}}}")?;
        }
        write!(
            f,
            "}}, rssKb: {}, sharedKb: {}, pssKb: {}, ussKb: {}, swapPssKb: {}}}",
            self.rss_kb, self.shared_kb, self.pss_kb, self.uss_kb, self.swap_pss_kb
        )
    }
}

impl fmt::Display for UidProcStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UidProcStats{{cpuTimeMillis: {}, cpuCycles: {}, totalMajorFaults: {}, \
             totalTasksCount: {}, ioBlockedTasksCount: {}, totalRssKb: {}, totalPssKb: {}, \
             processStatsByPid: {{",
            self.cpu_time_millis,
            self.cpu_cycles,
            self.total_major_faults,
            self.total_tasks_count,
            self.io_blocked_tasks_count,
            self.total_rss_kb,
            self.total_pss_kb,
        )?;
        for (idx, (pid, stats)) in sorted(&self.process_stats_by_pid).into_iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{{pid: {pid}, processStats: {stats}}}")?;
        }
        f.write_str("}}")
    }
}
