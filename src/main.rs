/// Entry point for the Uidstat Monitor.
///
/// This binary probes the process table, then periodically aggregates CPU time, CPU
/// cycles, major page faults, task counts and memory usage by the uid owning each
/// process, and logs a summary of the usage accrued in every interval.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the required procfs files are
/// not accessible.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info COLLECTION_INTERVAL_SECS=5 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    uidstat_monitor::run().await
}
