//! # cds-logstream
//!
//! Delivers a build's log lines to at most one live subscriber through a
//! bounded queue. A slow subscriber slows the producer down; lines are
//! never dropped while a subscriber is attached and never buffered when
//! none is.
//!
//! Stream closure and pipeline failure are separate signals: the stream
//! closes when the build is finished, while a failure is announced by a
//! marker line (see [`LogLine::is_failure_marker`](cds_entity::log::LogLine::is_failure_marker)).

pub mod drain;
pub mod error;
pub mod hub;
pub mod subscription;

pub use drain::{StreamOutcome, classify, drain};
pub use error::StreamError;
pub use hub::{LogHub, LogPublisher};
pub use subscription::LogSubscription;
