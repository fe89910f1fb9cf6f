use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Error that occurs when reading a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reads the whole file at the given path into a string.
///
/// procfs files report a size of zero, so the buffer grows as needed instead of
/// being sized from the metadata. Command names may hold arbitrary bytes; invalid
/// UTF-8 is replaced with `U+FFFD` rather than failing the read.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read.
///
/// # Example
/// ```no_run
/// # use uidstat_monitor::fsutil;
/// let contents = fsutil::read_to_string("/proc/self/stat")?;
/// # Ok::<(), fsutil::FileReadError>(())
/// ```
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, FileReadError> {
    let path = path.as_ref();
    let to_err = |source| FileReadError {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(to_err)?;
    let mut buf = Vec::with_capacity(512);
    file.read_to_end(&mut buf).map_err(to_err)?;
    Ok(match String::from_utf8(buf) {
        Ok(contents) => contents,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Returns `true` if the file at `path` can be opened for reading.
#[inline]
pub fn is_readable(path: impl AsRef<Path>) -> bool {
    File::open(path).is_ok()
}
