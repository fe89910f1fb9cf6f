//! Builders for fake process tables used in tests.

use std::fs;
use std::path::Path;

use super::sysconf::SystemClock;

/// 100 ticks per second and 4 KB pages: 10 ms per tick, 10 cycles per kHz-tick.
pub(crate) fn test_clock() -> SystemClock {
    SystemClock::new(100, 4096)
}

pub(crate) fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("path has a parent")).unwrap();
    fs::write(path, content).unwrap();
}

pub(crate) fn stat_line(
    pid: u32,
    comm: &str,
    state: &str,
    major_faults: u64,
    utime: u64,
    stime: u64,
    start_ticks: u64,
) -> String {
    format!(
        "{pid} ({comm}) {state} 1 {pid} {pid} 0 -1 4194304 100 0 {major_faults} 0 {utime} {stime} 0 0 20 0 1 0 {start_ticks} 12345678 1234 18446744073709551615 4194304 4238788 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0\n"
    )
}

/// Renders a single-policy `time_in_state` file.
pub(crate) fn time_in_state(entries: &[(u64, u64)]) -> String {
    let mut out = String::from("cpu0\n");
    for (freq, ticks) in entries {
        out.push_str(&format!("{freq} {ticks}\n"));
    }
    out
}

#[derive(Debug, Clone)]
pub(crate) struct FakeThread {
    pub tid: u32,
    pub state: &'static str,
    pub time_in_state: Option<String>,
}

/// A process directory with its status, accounting and task files.
#[derive(Debug, Clone)]
pub(crate) struct FakeProcess {
    pub pid: u32,
    pub uid: u32,
    pub tgid: u32,
    pub comm: String,
    pub state: &'static str,
    pub major_faults: u64,
    pub utime: u64,
    pub stime: u64,
    pub start_ticks: u64,
    pub with_status: bool,
    pub statm: Option<(u64, u64)>,
    pub smaps_rollup: Option<String>,
    pub threads: Vec<FakeThread>,
}

impl FakeProcess {
    pub fn new(pid: u32, uid: u32) -> Self {
        Self {
            pid,
            uid,
            tgid: pid,
            comm: format!("proc{pid}"),
            state: "S",
            major_faults: 0,
            utime: 0,
            stime: 0,
            start_ticks: 100,
            with_status: true,
            statm: Some((100, 40)),
            smaps_rollup: None,
            threads: vec![FakeThread {
                tid: pid,
                state: "S",
                time_in_state: None,
            }],
        }
    }

    pub fn cpu(mut self, utime: u64, stime: u64) -> Self {
        self.utime = utime;
        self.stime = stime;
        self
    }

    pub fn major_faults(mut self, major_faults: u64) -> Self {
        self.major_faults = major_faults;
        self
    }

    pub fn start_ticks(mut self, start_ticks: u64) -> Self {
        self.start_ticks = start_ticks;
        self
    }

    pub fn state(mut self, state: &'static str) -> Self {
        self.state = state;
        self
    }

    /// Sets the frequency accounting of the main thread.
    pub fn main_time_in_state(mut self, entries: &[(u64, u64)]) -> Self {
        let pid = self.pid;
        if let Some(main) = self.threads.iter_mut().find(|t| t.tid == pid) {
            main.time_in_state = Some(time_in_state(entries));
        }
        self
    }

    pub fn thread(mut self, tid: u32, state: &'static str, entries: Option<&[(u64, u64)]>) -> Self {
        self.threads.push(FakeThread {
            tid,
            state,
            time_in_state: entries.map(time_in_state),
        });
        self
    }

    pub fn write(&self, root: &Path) {
        let dir = root.join(self.pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        let stat = stat_line(
            self.pid,
            &self.comm,
            self.state,
            self.major_faults,
            self.utime,
            self.stime,
            self.start_ticks,
        );
        write(&dir.join("stat"), &stat);
        if self.with_status {
            write(
                &dir.join("status"),
                &format!(
                    "Name:\t{}\nTgid:\t{}\nPid:\t{}\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\n",
                    self.comm,
                    self.tgid,
                    self.pid,
                    uid = self.uid
                ),
            );
        }
        if let Some((rss, shared)) = self.statm {
            write(&dir.join("statm"), &format!("5000 {rss} {shared} 10 0 200 0\n"));
        }
        if let Some(rollup) = &self.smaps_rollup {
            write(&dir.join("smaps_rollup"), rollup);
        }
        for thread in &self.threads {
            let task = dir.join("task").join(thread.tid.to_string());
            fs::create_dir_all(&task).unwrap();
            let stat = stat_line(thread.tid, &self.comm, thread.state, 0, 1, 1, self.start_ticks);
            write(&task.join("stat"), &stat);
            if let Some(tis) = &thread.time_in_state {
                write(&task.join("time_in_state"), tis);
            }
        }
    }

    /// Removes the process directory, as if the process exited.
    pub fn remove(&self, root: &Path) {
        fs::remove_dir_all(root.join(self.pid.to_string())).unwrap();
    }
}
