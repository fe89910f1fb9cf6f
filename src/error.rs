//! Logging helpers for results whose failure must not stop the collection loop.

/// Turns a failed collection step into a logged error instead of an early return.
pub trait ResultOkLogExt<T, E> {
    /// Returns the success value, or logs the error at `error` level and returns `None`.
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
