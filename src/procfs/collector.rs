use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fsutil;

use super::delta::compute_delta;
use super::error::{CollectError, ReadError, Result};
use super::model::Snapshot;
use super::paths::ProcPaths;
use super::reader::{ProcessReader, ReaderSettings, read_proc_file};
use super::scanner;
use super::stats::{PidStat, PidStatus, TimeInState};
use super::sysconf::SystemClock;

/// Process whose files are probed to decide which features are available.
const PID_FOR_INIT: u32 = 1;

/// Returns whether the kernel exposes `smaps_rollup` below `root`.
pub fn smaps_rollup_supported(root: impl AsRef<Path>) -> bool {
    let root = root.as_ref();
    fsutil::is_readable(root.join("self/smaps_rollup"))
        || fsutil::is_readable(ProcPaths::new(root).smaps_rollup(PID_FOR_INIT))
}

/// Static options of a [`UidProcStatsCollector`].
#[derive(Debug, Clone, Copy)]
pub struct CollectorOptions {
    pub memory_profiling_enabled: bool,
    pub smaps_rollup_supported: bool,
    pub clock: SystemClock,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            memory_profiling_enabled: true,
            smaps_rollup_supported: false,
            clock: SystemClock::detect(),
        }
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    enabled: bool,
    time_in_state_enabled: bool,
    latest: Snapshot,
    delta: Snapshot,
}

/// Collects per-uid process stats from a procfs tree.
///
/// Call [`init`](Self::init) once before the first [`collect`](Self::collect). Every
/// pass replaces the latest snapshot and the delta against the previous pass together;
/// readers never observe one without the other.
#[derive(Debug)]
pub struct UidProcStatsCollector {
    paths: ProcPaths,
    options: CollectorOptions,
    state: Mutex<CollectorState>,
}

impl UidProcStatsCollector {
    pub fn new(root: impl Into<PathBuf>, options: CollectorOptions) -> Self {
        Self {
            paths: ProcPaths::new(root),
            options,
            state: Mutex::new(CollectorState::default()),
        }
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Probes the files of the init process and enables the features they support.
    pub fn init(&self) {
        let pid_stat = self.paths.stat(PID_FOR_INIT);
        let tid_stat = self.paths.task_stat(PID_FOR_INIT, PID_FOR_INIT);
        let pid_status = self.paths.status(PID_FOR_INIT);
        let statm = self.paths.statm(PID_FOR_INIT);
        let time_in_state = self.paths.task_time_in_state(PID_FOR_INIT, PID_FOR_INIT);

        let mut missing: Vec<&Path> = [&pid_stat, &tid_stat, &pid_status]
            .into_iter()
            .filter(|path| !fsutil::is_readable(path))
            .map(PathBuf::as_path)
            .collect();
        if self.options.memory_profiling_enabled
            && !self.options.smaps_rollup_supported
            && !fsutil::is_readable(&statm)
        {
            missing.push(&statm);
        }

        let time_in_state_enabled = read_proc_file::<TimeInState>(time_in_state.clone())
            .is_ok_and(|tis| tis.cpu_cycles(self.options.clock.cycles_per_khz_tick()) > 0);
        if !time_in_state_enabled {
            log::warn!(
                "time in state collection is not enabled; missing time in state file at `{}`",
                time_in_state.display()
            );
        }

        let enabled = missing.is_empty();
        if !enabled {
            let paths: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            log::error!(
                "disabling uid proc stats collection; inaccessible files: {}",
                paths.join(", ")
            );
        }

        let mut state = self.lock();
        state.enabled = enabled;
        state.time_in_state_enabled = time_in_state_enabled;
    }

    /// Runs one collection pass.
    ///
    /// # Errors
    ///
    /// - [`CollectError::Disabled`] if [`init`](Self::init) found required files missing
    ///   or was never called.
    /// - [`CollectError::OpenRoot`] or [`CollectError::Malformed`] if the scan failed. The
    ///   retained snapshots are left unchanged.
    pub fn collect(&self) -> Result<()> {
        let mut state = self.lock();
        if !state.enabled {
            return Err(CollectError::Disabled {
                root: self.paths.root().to_path_buf(),
            });
        }

        let settings = ReaderSettings {
            clock: self.options.clock,
            memory_profiling_enabled: self.options.memory_profiling_enabled,
            smaps_rollup_supported: self.options.smaps_rollup_supported,
            time_in_state_enabled: state.time_in_state_enabled,
        };
        let reader = ProcessReader::new(&self.paths, settings, &state.latest);
        let latest = scanner::scan(self.paths.root(), &reader)?;

        state.delta = compute_delta(&state.latest, &latest);
        state.latest = latest;
        Ok(())
    }

    /// Absolute stats of the last successful pass.
    pub fn latest_stats(&self) -> Snapshot {
        self.lock().latest.clone()
    }

    /// Stats accrued between the last two successful passes.
    pub fn delta_stats(&self) -> Snapshot {
        self.lock().delta.clone()
    }

    pub fn enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn time_in_state_enabled(&self) -> bool {
        self.lock().time_in_state_enabled
    }

    /// Reads the `stat` file of a single process.
    pub fn read_pid_stat(&self, pid: u32) -> std::result::Result<PidStat, ReadError> {
        read_proc_file(self.paths.stat(pid))
    }

    /// Reads the `status` file of a single process.
    pub fn read_pid_status(&self, pid: u32) -> std::result::Result<PidStatus, ReadError> {
        read_proc_file(self.paths.status(pid))
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        // State is only ever replaced wholesale, so a poisoned lock holds a consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
