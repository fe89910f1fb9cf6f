use std::path::PathBuf;

use crate::fsutil::FileReadError;

use super::stats::StatParseError;

/// Why a process or thread was skipped.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("file is unreadable: {0}")]
    Unreadable(#[source] std::io::Error),
    #[error("thread group id {tgid} does not match the pid")]
    NotThreadGroupLeader { tgid: u32 },
    #[error("owning uid could not be resolved")]
    UnresolvedUid,
}

/// Error returned when reading a process or one of its files.
///
/// [`ReadError::Recoverable`] means the process (or thread) most likely exited while
/// it was being read; the scan skips it and continues. [`ReadError::Fatal`] means the
/// file was read but its contents are malformed, which aborts the whole pass.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("skipping `{path}`: {reason}")]
    Recoverable {
        path: PathBuf,
        #[source]
        reason: SkipReason,
    },
    #[error("malformed contents in `{path}`: {source}")]
    Fatal {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
}

impl ReadError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReadError::Recoverable { .. })
    }

    pub(crate) fn skip(path: PathBuf, reason: SkipReason) -> Self {
        ReadError::Recoverable { path, reason }
    }
}

impl From<FileReadError> for ReadError {
    fn from(err: FileReadError) -> Self {
        ReadError::skip(err.path, SkipReason::Unreadable(err.source))
    }
}

/// Error returned by a collection pass. Nothing is committed when a pass fails.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("process stats collection is disabled: required files under `{root}` are not accessible")]
    Disabled { root: PathBuf },
    #[error("failed to open process table root `{path}`: {source}")]
    OpenRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed contents in `{path}`: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
}

pub type Result<T> = std::result::Result<T, CollectError>;
