//! Differences between two consecutive snapshots.
//!
//! Counters (CPU time, CPU cycles, major faults) become the amount accrued since the
//! previous pass. Gauges (task counts, memory) keep their current absolute value.
//! A counter that went backwards was reset, so the new value is the delta.

use std::collections::HashMap;

use super::model::{ProcessStats, Snapshot, UidProcStats};

/// Computes the delta of `current` against `previous`.
///
/// Uids missing from `current` are absent from the result.
pub fn compute_delta(previous: &Snapshot, current: &Snapshot) -> Snapshot {
    current
        .iter()
        .map(|(uid, current_uid)| {
            let delta = match previous.get(uid) {
                Some(previous_uid) => uid_delta(previous_uid, current_uid),
                None => current_uid.clone(),
            };
            (*uid, delta)
        })
        .collect()
}

fn uid_delta(previous: &UidProcStats, current: &UidProcStats) -> UidProcStats {
    let mut delta = UidProcStats::default();
    for (pid, stats) in &current.process_stats_by_pid {
        let process = match previous.find_instance(*pid, stats.start_time_millis) {
            Some(old) => process_delta(old, stats),
            None => stats.clone(),
        };
        delta.add_process(*pid, process);
    }
    delta
}

/// Computes the delta of one process instance.
pub fn process_delta(previous: &ProcessStats, current: &ProcessStats) -> ProcessStats {
    let cpu_cycles_by_tid: HashMap<u32, u64> = current
        .cpu_cycles_by_tid
        .iter()
        .map(|(tid, cycles)| {
            let old = previous.cpu_cycles_by_tid.get(tid).copied().unwrap_or(0);
            (*tid, counter_delta(old, *cycles))
        })
        .collect();
    let total_cpu_cycles = cpu_cycles_by_tid
        .values()
        .fold(0u64, |acc, cycles| acc.saturating_add(*cycles));

    ProcessStats {
        comm: current.comm.clone(),
        start_time_millis: current.start_time_millis,
        cpu_time_millis: counter_delta(previous.cpu_time_millis, current.cpu_time_millis),
        total_cpu_cycles,
        total_major_faults: counter_delta(previous.total_major_faults, current.total_major_faults),
        cpu_cycles_by_tid,
        ..current.clone()
    }
}

fn counter_delta(old: u64, new: u64) -> u64 {
    if new >= old { new - old } else { new }
}
