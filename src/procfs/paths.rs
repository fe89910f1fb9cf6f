use std::path::{Path, PathBuf};

/// Resolves the per-process and per-thread files below a process table root,
/// usually `/proc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcPaths {
    root: PathBuf,
}

impl ProcPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pid_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// `<root>/<pid>/stat`
    pub fn stat(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("stat")
    }

    /// `<root>/<pid>/status`
    pub fn status(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("status")
    }

    /// `<root>/<pid>/statm`
    pub fn statm(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("statm")
    }

    /// `<root>/<pid>/smaps_rollup`
    pub fn smaps_rollup(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("smaps_rollup")
    }

    /// `<root>/<pid>/task`
    pub fn task_dir(&self, pid: u32) -> PathBuf {
        self.pid_dir(pid).join("task")
    }

    /// `<root>/<pid>/task/<tid>/stat`
    pub fn task_stat(&self, pid: u32, tid: u32) -> PathBuf {
        self.task_dir(pid).join(tid.to_string()).join("stat")
    }

    /// `<root>/<pid>/task/<tid>/time_in_state`
    pub fn task_time_in_state(&self, pid: u32, tid: u32) -> PathBuf {
        self.task_dir(pid).join(tid.to_string()).join("time_in_state")
    }
}

impl Default for ProcPaths {
    fn default() -> Self {
        Self::new("/proc")
    }
}
