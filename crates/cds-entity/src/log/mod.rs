//! Build log lines and the key identifying a build's log stream.

pub mod key;
pub mod line;

pub use key::{BuildKey, LATEST_BUILD};
pub use line::{FAILURE_MARKER, LogLine};
