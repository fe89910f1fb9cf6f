//! System constants needed to convert procfs units.

/// Fallback when `sysconf(_SC_CLK_TCK)` is unavailable.
const DEFAULT_CLOCK_TICKS_PER_SEC: u64 = 100;
const DEFAULT_PAGE_SIZE_BYTES: u64 = 4096;

/// Clock tick rate and page size, read once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    clock_ticks_per_sec: u64,
    page_size_bytes: u64,
}

impl SystemClock {
    /// Builds a clock from explicit values; zero values fall back to the defaults.
    pub fn new(clock_ticks_per_sec: u64, page_size_bytes: u64) -> Self {
        Self {
            clock_ticks_per_sec: if clock_ticks_per_sec == 0 {
                DEFAULT_CLOCK_TICKS_PER_SEC
            } else {
                clock_ticks_per_sec
            },
            page_size_bytes: if page_size_bytes == 0 {
                DEFAULT_PAGE_SIZE_BYTES
            } else {
                page_size_bytes
            },
        }
    }

    /// Reads the values of the running system.
    pub fn detect() -> Self {
        Self::new(sysconf(libc::_SC_CLK_TCK), sysconf(libc::_SC_PAGESIZE))
    }

    pub fn clock_ticks_per_sec(&self) -> u64 {
        self.clock_ticks_per_sec
    }

    /// Length of one clock tick in whole milliseconds.
    pub fn millis_per_tick(&self) -> u64 {
        1000 / self.clock_ticks_per_sec
    }

    /// CPU cycles represented by one clock tick at 1 kHz.
    pub fn cycles_per_khz_tick(&self) -> u64 {
        1000 / self.clock_ticks_per_sec
    }

    /// Page size in KB, at least 1.
    pub fn page_size_kb(&self) -> u64 {
        (self.page_size_bytes / 1024).max(1)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::detect()
    }
}

/// Returns the value of a `sysconf(3)` variable, or 0 if it is undefined.
fn sysconf(name: libc::c_int) -> u64 {
    // SAFETY: sysconf has no preconditions; it returns -1 for unknown names.
    let value = unsafe { libc::sysconf(name) };
    u64::try_from(value).unwrap_or(0)
}
