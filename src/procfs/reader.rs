//! Reads the resource usage of one process and its threads.

use std::path::PathBuf;

use crate::fsutil;

use super::error::{ReadError, SkipReason};
use super::model::{ProcessStats, Snapshot, find_uid_of_instance};
use super::paths::ProcPaths;
use super::scanner;
use super::stats::{PidStat, PidStatus, ProcFile, SmapsRollup, Statm, TimeInState};
use super::sysconf::SystemClock;

/// Reads the file at `path` and parses it as `T`.
///
/// # Errors
///
/// - [`ReadError::Recoverable`] if the file cannot be read.
/// - [`ReadError::Fatal`] if its contents are malformed.
pub fn read_proc_file<T: ProcFile>(path: PathBuf) -> Result<T, ReadError> {
    let content = fsutil::read_to_string(&path)?;
    T::parse(&content).map_err(|source| ReadError::Fatal { path, source })
}

/// Settings fixed for the duration of one collection pass.
#[derive(Debug, Clone, Copy)]
pub struct ReaderSettings {
    pub clock: SystemClock,
    pub memory_profiling_enabled: bool,
    pub smaps_rollup_supported: bool,
    pub time_in_state_enabled: bool,
}

/// Reads processes below a process table root.
///
/// `previous` is the snapshot retained from the last pass; it resolves the owner of a
/// process whose `status` file vanished after its `stat` file was read.
#[derive(Debug)]
pub struct ProcessReader<'a> {
    paths: &'a ProcPaths,
    settings: ReaderSettings,
    previous: &'a Snapshot,
}

impl<'a> ProcessReader<'a> {
    pub fn new(paths: &'a ProcPaths, settings: ReaderSettings, previous: &'a Snapshot) -> Self {
        Self {
            paths,
            settings,
            previous,
        }
    }

    /// Reads the stats of process `pid` and returns them with the owning uid.
    ///
    /// # Errors
    ///
    /// - [`ReadError::Recoverable`] if the process vanished, is not a thread group
    ///   leader, or its owner cannot be resolved.
    /// - [`ReadError::Fatal`] if any file has malformed contents.
    pub fn read_process(&self, pid: u32) -> Result<(u32, ProcessStats), ReadError> {
        let millis_per_tick = self.settings.clock.millis_per_tick();
        let stat: PidStat = read_proc_file(self.paths.stat(pid))?;
        let start_time_millis = stat.start_time_millis(millis_per_tick);

        let uid = self.resolve_uid(pid, start_time_millis)?;

        let mut stats = ProcessStats {
            cpu_time_millis: stat.cpu_time_millis(millis_per_tick),
            start_time_millis,
            // The top-level counter already aggregates all threads, including exited ones.
            total_major_faults: stat.major_faults,
            total_tasks_count: 1,
            io_blocked_tasks_count: u32::from(stat.is_io_blocked()),
            comm: stat.comm,
            ..Default::default()
        };

        self.read_memory(pid, &mut stats)?;
        self.read_tasks(pid, &mut stats)?;

        Ok((uid, stats))
    }

    fn resolve_uid(&self, pid: u32, start_time_millis: u64) -> Result<u32, ReadError> {
        let path = self.paths.status(pid);
        match read_proc_file::<PidStatus>(path.clone()) {
            Ok(status) if status.tgid != pid => Err(ReadError::skip(
                path,
                SkipReason::NotThreadGroupLeader { tgid: status.tgid },
            )),
            Ok(status) => Ok(status.uid),
            Err(err) if err.is_recoverable() => {
                log::debug!("{err}; looking up pid {pid} in the previous snapshot");
                find_uid_of_instance(self.previous, pid, start_time_millis)
                    .ok_or_else(|| ReadError::skip(path, SkipReason::UnresolvedUid))
            }
            Err(err) => Err(err),
        }
    }

    fn read_memory(&self, pid: u32, stats: &mut ProcessStats) -> Result<(), ReadError> {
        if !self.settings.memory_profiling_enabled || self.read_smaps_rollup(pid, stats) {
            return Ok(());
        }

        let page_size_kb = self.settings.clock.page_size_kb();
        match read_proc_file::<Statm>(self.paths.statm(pid)) {
            Ok(statm) => {
                stats.rss_kb = statm.rss_kb(page_size_kb);
                stats.shared_kb = statm.shared_kb(page_size_kb);
                stats.uss_kb = statm.uss_kb(page_size_kb);
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                log::debug!("{err}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Fills the memory fields from `smaps_rollup`. Returns `false` when the caller
    /// must fall back to `statm`.
    fn read_smaps_rollup(&self, pid: u32, stats: &mut ProcessStats) -> bool {
        if !self.settings.smaps_rollup_supported {
            return false;
        }
        match read_proc_file::<SmapsRollup>(self.paths.smaps_rollup(pid)) {
            Ok(rollup) if rollup.is_populated() => {
                stats.rss_kb = rollup.rss_kb;
                stats.shared_kb = rollup.shared_kb();
                stats.pss_kb = rollup.pss_kb;
                stats.uss_kb = rollup.uss_kb();
                stats.swap_pss_kb = rollup.swap_pss_kb;
                true
            }
            Ok(_) => false,
            Err(err) => {
                log::debug!("{err}; falling back to statm");
                false
            }
        }
    }

    fn read_tasks(&self, pid: u32, stats: &mut ProcessStats) -> Result<(), ReadError> {
        let task_dir = self.paths.task_dir(pid);
        let tids = match scanner::list_numeric_dirs(&task_dir) {
            Ok(tids) => tids,
            Err(err) => {
                log::debug!("failed to list tasks in `{}`: {err}", task_dir.display());
                return Ok(());
            }
        };

        for tid in tids {
            if tid != pid {
                match read_proc_file::<PidStat>(self.paths.task_stat(pid, tid)) {
                    Ok(tid_stat) => {
                        stats.total_tasks_count += 1;
                        stats.io_blocked_tasks_count += u32::from(tid_stat.is_io_blocked());
                    }
                    Err(err) if err.is_recoverable() => {
                        // The thread exited after it was listed.
                        log::debug!("{err}");
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }

            if !self.settings.time_in_state_enabled {
                continue;
            }
            match read_proc_file::<TimeInState>(self.paths.task_time_in_state(pid, tid)) {
                Ok(tis) => {
                    let cycles = tis.cpu_cycles(self.settings.clock.cycles_per_khz_tick());
                    if cycles == 0 {
                        continue;
                    }
                    stats.total_cpu_cycles = stats.total_cpu_cycles.saturating_add(cycles);
                    stats.cpu_cycles_by_tid.insert(tid, cycles);
                }
                Err(err) if err.is_recoverable() => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::procfs::model::UidProcStats;
    use crate::procfs::testutil::{FakeProcess, test_clock, write};

    fn settings() -> ReaderSettings {
        ReaderSettings {
            clock: test_clock(),
            memory_profiling_enabled: true,
            smaps_rollup_supported: false,
            time_in_state_enabled: true,
        }
    }

    fn read(root: &std::path::Path, pid: u32) -> Result<(u32, ProcessStats), ReadError> {
        read_with(root, pid, settings(), &Snapshot::new())
    }

    fn read_with(
        root: &std::path::Path,
        pid: u32,
        settings: ReaderSettings,
        previous: &Snapshot,
    ) -> Result<(u32, ProcessStats), ReadError> {
        let paths = ProcPaths::new(root);
        ProcessReader::new(&paths, settings, previous).read_process(pid)
    }

    #[test]
    fn test_read_process() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(100, 1000)
            .cpu(70, 30)
            .major_faults(12)
            .start_ticks(500)
            .main_time_in_state(&[(1000, 2)])
            .thread(101, "D", Some(&[(2000, 3)]))
            .thread(102, "S", None)
            .write(dir.path());

        let (uid, stats) = read(dir.path(), 100).unwrap();

        assert_eq!(uid, 1000);
        assert_eq!(stats.comm, "proc100");
        assert_eq!(stats.cpu_time_millis, 1000);
        assert_eq!(stats.start_time_millis, 5000);
        assert_eq!(stats.total_major_faults, 12);
        assert_eq!(stats.total_tasks_count, 3);
        assert_eq!(stats.io_blocked_tasks_count, 1);
        assert_eq!(
            stats.cpu_cycles_by_tid,
            HashMap::from([(100, 20_000), (101, 60_000)])
        );
        assert_eq!(stats.total_cpu_cycles, 80_000);
        assert_eq!(stats.rss_kb, 400);
        assert_eq!(stats.shared_kb, 160);
        assert_eq!(stats.uss_kb, 240);
        assert_eq!(stats.pss_kb, 0);
    }

    #[test]
    fn test_blocked_main_thread_is_counted_once() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(5, 0).state("D").write(dir.path());

        let (_, stats) = read(dir.path(), 5).unwrap();
        assert_eq!(stats.total_tasks_count, 1);
        assert_eq!(stats.io_blocked_tasks_count, 1);
    }

    #[test]
    fn test_missing_stat_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(dir.path(), 42).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_malformed_stat_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("42/stat"), "42 (broken S 1\n");
        let err = read(dir.path(), 42).unwrap_err();
        assert!(matches!(err, ReadError::Fatal { .. }));
    }

    #[test]
    fn test_non_utf8_comm_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let process = FakeProcess::new(70, 3000).cpu(400, 100);
        process.write(dir.path());
        let mut stat = b"70 (bad\xffname) S ".to_vec();
        stat.extend_from_slice(
            b"1 70 70 0 -1 4194304 100 0 0 0 400 100 0 0 20 0 1 0 100 12345678 1234\n",
        );
        std::fs::write(dir.path().join("70/stat"), stat).unwrap();

        let (uid, stats) = read(dir.path(), 70).unwrap();
        assert_eq!(uid, 3000);
        assert_eq!(stats.comm, "bad\u{FFFD}name");
        assert_eq!(stats.cpu_time_millis, 5000);
    }

    #[test]
    fn test_non_leader_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(43, 1000);
        process.tgid = 40;
        process.write(dir.path());

        match read(dir.path(), 43).unwrap_err() {
            ReadError::Recoverable {
                reason: SkipReason::NotThreadGroupLeader { tgid },
                ..
            } => assert_eq!(tgid, 40),
            err => panic!("Expected NotThreadGroupLeader, got {err:?}"),
        }
    }

    #[test]
    fn test_malformed_status_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(44, 1000);
        process.with_status = false;
        process.write(dir.path());
        write(&dir.path().join("44/status"), "Uid:\tnope\t0\t0\t0\nTgid:\t44\n");

        let err = read(dir.path(), 44).unwrap_err();
        assert!(matches!(err, ReadError::Fatal { .. }));
    }

    #[test]
    fn test_missing_status_without_history_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(45, 1000);
        process.with_status = false;
        process.write(dir.path());

        match read(dir.path(), 45).unwrap_err() {
            ReadError::Recoverable {
                reason: SkipReason::UnresolvedUid,
                ..
            } => {}
            err => panic!("Expected UnresolvedUid, got {err:?}"),
        }
    }

    #[test]
    fn test_missing_status_falls_back_to_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(46, 1000).start_ticks(7);
        process.with_status = false;
        process.write(dir.path());

        let mut uid_stats = UidProcStats::default();
        uid_stats.add_process(
            46,
            ProcessStats {
                start_time_millis: 70,
                ..Default::default()
            },
        );
        let previous = Snapshot::from([(2000, uid_stats)]);

        let (uid, stats) = read_with(dir.path(), 46, settings(), &previous).unwrap();
        assert_eq!(uid, 2000);
        assert_eq!(stats.start_time_millis, 70);

        // A different start time means the pid was reused; history does not apply.
        let mut reused = FakeProcess::new(46, 1000).start_ticks(8);
        reused.with_status = false;
        reused.write(dir.path());
        let err = read_with(dir.path(), 46, settings(), &previous).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_vanished_thread_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(50, 1000)
            .thread(51, "S", Some(&[(1000, 1)]))
            .write(dir.path());
        // Thread 51 exited between listing and reading its stat file.
        std::fs::remove_file(dir.path().join("50/task/51/stat")).unwrap();

        let (_, stats) = read(dir.path(), 50).unwrap();
        assert_eq!(stats.total_tasks_count, 1);
        assert!(stats.cpu_cycles_by_tid.is_empty());
    }

    #[test]
    fn test_missing_time_in_state_only_excludes_that_thread() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(60, 1000)
            .main_time_in_state(&[(1000, 1)])
            .thread(61, "S", None)
            .thread(62, "S", Some(&[(3000, 1)]))
            .thread(63, "S", Some(&[(0, 5)]))
            .write(dir.path());

        let (_, stats) = read(dir.path(), 60).unwrap();
        assert_eq!(stats.total_tasks_count, 4);
        assert_eq!(
            stats.cpu_cycles_by_tid,
            HashMap::from([(60, 10_000), (62, 30_000)])
        );
        assert_eq!(stats.total_cpu_cycles, 40_000);
    }

    #[test]
    fn test_malformed_time_in_state_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(64, 1000).write(dir.path());
        write(&dir.path().join("64/task/64/time_in_state"), "cpu0\n1000\n");

        let err = read(dir.path(), 64).unwrap_err();
        assert!(matches!(err, ReadError::Fatal { .. }));
    }

    #[test]
    fn test_time_in_state_disabled() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(65, 1000)
            .main_time_in_state(&[(1000, 1)])
            .write(dir.path());

        let settings = ReaderSettings {
            time_in_state_enabled: false,
            ..settings()
        };
        let (_, stats) = read_with(dir.path(), 65, settings, &Snapshot::new()).unwrap();
        assert_eq!(stats.total_cpu_cycles, 0);
        assert!(stats.cpu_cycles_by_tid.is_empty());
    }

    #[test]
    fn test_smaps_rollup_preferred_over_statm() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(70, 1000);
        process.smaps_rollup = Some(
            "Rss: 900 kB\nPss: 500 kB\nShared_Clean: 100 kB\nPrivate_Dirty: 300 kB\nSwapPss: 8 kB\n"
                .into(),
        );
        process.write(dir.path());

        let settings = ReaderSettings {
            smaps_rollup_supported: true,
            ..settings()
        };
        let (_, stats) = read_with(dir.path(), 70, settings, &Snapshot::new()).unwrap();
        assert_eq!(stats.rss_kb, 900);
        assert_eq!(stats.pss_kb, 500);
        assert_eq!(stats.shared_kb, 100);
        assert_eq!(stats.uss_kb, 300);
        assert_eq!(stats.swap_pss_kb, 8);
    }

    #[test]
    fn test_unpopulated_smaps_rollup_falls_back_to_statm() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(71, 1000);
        process.smaps_rollup = Some("Rss: 0 kB\nPss: 0 kB\n".into());
        process.write(dir.path());

        let settings = ReaderSettings {
            smaps_rollup_supported: true,
            ..settings()
        };
        let (_, stats) = read_with(dir.path(), 71, settings, &Snapshot::new()).unwrap();
        assert_eq!(stats.rss_kb, 400);
        assert_eq!(stats.uss_kb, 240);
    }

    #[test]
    fn test_memory_profiling_disabled() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(72, 1000).write(dir.path());
        write(&dir.path().join("72/statm"), "garbage\n");

        let settings = ReaderSettings {
            memory_profiling_enabled: false,
            ..settings()
        };
        let (_, stats) = read_with(dir.path(), 72, settings, &Snapshot::new()).unwrap();
        assert_eq!(stats.rss_kb, 0);
    }

    #[test]
    fn test_missing_statm_leaves_memory_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut process = FakeProcess::new(73, 1000);
        process.statm = None;
        process.write(dir.path());

        let (_, stats) = read(dir.path(), 73).unwrap();
        assert_eq!(stats.rss_kb, 0);
        assert_eq!(stats.uss_kb, 0);
    }

    #[test]
    fn test_malformed_statm_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        FakeProcess::new(74, 1000).write(dir.path());
        write(&dir.path().join("74/statm"), "1 2\n");

        let err = read(dir.path(), 74).unwrap_err();
        assert!(matches!(err, ReadError::Fatal { .. }));
    }
}
