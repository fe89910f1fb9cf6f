//! Enumerates the processes of the process table and folds them into a snapshot.

use std::fs;
use std::io;
use std::path::Path;

use super::error::{CollectError, ReadError, Result};
use super::model::Snapshot;
use super::reader::ProcessReader;

/// Lists the sub-directories of `dir` whose names are decimal ids, in ascending order.
///
/// Entries that vanish or error while listing are skipped.
///
/// # Errors
///
/// Returns an error only if `dir` itself cannot be opened.
pub fn list_numeric_dirs(dir: &Path) -> io::Result<Vec<u32>> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(dir)?.flatten() {
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(id) = name.parse() {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

/// Reads every process below `root` and aggregates them by uid.
///
/// Processes that disappear or are not thread group leaders are skipped. The first
/// malformed file aborts the scan.
///
/// # Errors
///
/// - [`CollectError::OpenRoot`] if `root` cannot be listed.
/// - [`CollectError::Malformed`] if any file has malformed contents.
pub fn scan(root: &Path, reader: &ProcessReader<'_>) -> Result<Snapshot> {
    let pids = list_numeric_dirs(root).map_err(|source| CollectError::OpenRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut snapshot = Snapshot::with_capacity(pids.len() / 4);
    for pid in pids {
        match reader.read_process(pid) {
            Ok((uid, stats)) => snapshot.entry(uid).or_default().add_process(pid, stats),
            Err(err @ ReadError::Recoverable { .. }) => log::debug!("{err}"),
            Err(ReadError::Fatal { path, source }) => {
                return Err(CollectError::Malformed { path, source });
            }
        }
    }
    Ok(snapshot)
}
