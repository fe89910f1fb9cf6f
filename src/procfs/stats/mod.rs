//! Stateless parsers for the procfs files read by the collector.
//!
//! Every parser consumes the full contents of one file and returns either a typed
//! record or a [`StatParseError`]. A parse error means the contents were present but
//! malformed; it never means the file was missing.
//!
//! # Main types
//!
//! - [`PidStat`]: accounting line from `stat` (per process and per thread).
//! - [`PidStatus`]: owner uid and thread group id from `status`.
//! - [`TimeInState`]: per-thread CPU frequency accounting from `time_in_state`.
//! - [`SmapsRollup`] and [`Statm`]: the two memory summary forms.

mod error;
mod memory;
mod parser;
mod pid_stat;
mod status;
mod time_in_state;

pub use error::StatParseError;
pub use memory::{SmapsRollup, Statm};
pub use parser::{KeyValueParser, ProcFile};
pub use pid_stat::PidStat;
pub use status::PidStatus;
pub use time_in_state::TimeInState;
