//! Uidstat Monitor: collects per-uid CPU, page fault, task and memory usage from the
//! Linux process table.
//!
//! This library provides the procfs parsers, the per-process reader, and the collector
//! that aggregates processes by owning uid and computes the usage accrued between
//! collection passes.
use std::sync::Arc;

use error::ResultOkLogExt;

pub mod config;
pub mod error;
pub mod fsutil;
pub mod procfs;
pub mod report;

/// Runs the Uidstat Monitor.
///
/// Reads the configuration from the environment, probes the process table once, then
/// collects a snapshot every interval and logs a summary of each pass.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid configuration values (e.g., `COLLECTION_INTERVAL_SECS=0`).
/// - A failed join of the blocking collection task.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Config: {config:?}");

    let options = config.collector_options();
    log::debug!(
        "Proc root: {}, smaps_rollup supported: {}",
        config.proc_root.display(),
        options.smaps_rollup_supported
    );
    let collector = Arc::new(procfs::UidProcStatsCollector::new(
        config.proc_root.clone(),
        options,
    ));
    {
        let collector = Arc::clone(&collector);
        tokio::task::spawn_blocking(move || collector.init()).await?;
    }
    if !collector.enabled() {
        return Err(format!(
            "uid proc stats collection is disabled for `{}`",
            config.proc_root.display()
        )
        .into());
    }

    let mut interval = tokio::time::interval(config.interval);
    loop {
        interval.tick().await;
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();
        log::trace!("Collecting uid proc stats@{timestamp}");

        let collector = Arc::clone(&collector);
        let delta = tokio::task::spawn_blocking(move || {
            let before = std::time::Instant::now();
            let result = collector.collect();
            let took = before.elapsed();
            log::trace!("collect() took {} nanoseconds", took.as_nanos());
            result.ok_log().map(|()| collector.delta_stats())
        })
        .await?;

        let Some(delta) = delta else {
            continue;
        };
        let report = report::PassReport::from_delta(&delta, config.report_top_uids);
        log::info!("{report}");
        if log::log_enabled!(log::Level::Trace) {
            match serde_json::to_string(&delta) {
                Ok(json) => log::trace!("Delta: {json}"),
                Err(err) => log::error!("failed to serialize delta: {err}"),
            }
        }
    }
}
