use std::path::PathBuf;
use std::time::Duration;

use crate::procfs;

const DEFAULT_PROC_ROOT: &str = "/proc";
const DEFAULT_INTERVAL_SECS: u64 = 1;
const DEFAULT_TOP_UIDS: usize = 5;

/// Errors that may occur while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{key}` has invalid value `{value}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("environment variable `{key}` is not valid unicode")]
    NotUnicode { key: &'static str },
}

/// Runtime configuration of the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub proc_root: PathBuf,
    pub interval: Duration,
    pub memory_profiling_enabled: bool,
    /// `None` means the capability is probed below [`proc_root`](Self::proc_root).
    pub smaps_rollup: Option<bool>,
    pub report_top_uids: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `PROC_ROOT` | `/proc` |
    /// | `COLLECTION_INTERVAL_SECS` | `1` |
    /// | `MEMORY_PROFILING` | `true` |
    /// | `SMAPS_ROLLUP` | probed |
    /// | `REPORT_TOP_UIDS` | `5` |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key }),
        })
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let proc_root = lookup("PROC_ROOT")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT));

        let interval_secs = match lookup("COLLECTION_INTERVAL_SECS")? {
            Some(value) => parse_interval(value)?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let memory_profiling_enabled = match lookup("MEMORY_PROFILING")? {
            Some(value) => parse_bool("MEMORY_PROFILING", value)?,
            None => true,
        };

        let smaps_rollup = lookup("SMAPS_ROLLUP")?
            .map(|value| parse_bool("SMAPS_ROLLUP", value))
            .transpose()?;

        let report_top_uids = match lookup("REPORT_TOP_UIDS")? {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|err: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "REPORT_TOP_UIDS",
                    reason: err.to_string(),
                    value,
                })?,
            None => DEFAULT_TOP_UIDS,
        };

        Ok(Self {
            proc_root,
            interval: Duration::from_secs(interval_secs),
            memory_profiling_enabled,
            smaps_rollup,
            report_top_uids,
        })
    }

    /// Options for a collector reading [`proc_root`](Self::proc_root).
    pub fn collector_options(&self) -> procfs::CollectorOptions {
        procfs::CollectorOptions {
            memory_profiling_enabled: self.memory_profiling_enabled,
            smaps_rollup_supported: self
                .smaps_rollup
                .unwrap_or_else(|| procfs::smaps_rollup_supported(&self.proc_root)),
            clock: procfs::SystemClock::detect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            memory_profiling_enabled: true,
            smaps_rollup: None,
            report_top_uids: DEFAULT_TOP_UIDS,
        }
    }
}

fn parse_interval(value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: "COLLECTION_INTERVAL_SECS",
            value,
            reason: "must be greater than zero".into(),
        }),
        Ok(secs) => Ok(secs),
        Err(err) => Err(ConfigError::InvalidValue {
            key: "COLLECTION_INTERVAL_SECS",
            reason: err.to_string(),
            value,
        }),
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected one of `true`, `false`, `1`, `0`".into(),
        }),
    }
}
