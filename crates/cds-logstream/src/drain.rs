//! Consumer loop shared by the CLI and tests.

use cds_entity::log::LogLine;

use crate::subscription::LogSubscription;

/// How a drained stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream closed without a failure marker.
    Completed,
    /// A failure marker arrived; it is carried here and was not passed to the sink.
    PipelineFailed(LogLine),
}

impl StreamOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PipelineFailed(_))
    }
}

/// Feed every ordinary line to `sink` until the stream closes or a
/// failure marker arrives. The subscription is dropped on return, which
/// stops the producer from queueing more lines for it.
pub async fn drain<F>(mut subscription: LogSubscription, mut sink: F) -> StreamOutcome
where
    F: FnMut(LogLine),
{
    while let Some(line) = subscription.next().await {
        if line.is_failure_marker() {
            return StreamOutcome::PipelineFailed(line);
        }
        sink(line);
    }
    StreamOutcome::Completed
}

/// Classify lines that arrive from a source other than a [`LogSubscription`].
pub fn classify<I>(lines: I, mut sink: impl FnMut(LogLine)) -> StreamOutcome
where
    I: IntoIterator<Item = LogLine>,
{
    for line in lines {
        if line.is_failure_marker() {
            return StreamOutcome::PipelineFailed(line);
        }
        sink(line);
    }
    StreamOutcome::Completed
}
