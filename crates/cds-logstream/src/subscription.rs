//! Consumer side of a build log stream.

use std::sync::Arc;

use dashmap::DashMap;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use cds_entity::log::{BuildKey, LogLine};

use crate::hub::Slot;

/// The single live reader of a build's log.
///
/// Dropping the subscription detaches it; a producer blocked on a full
/// queue is released immediately.
#[derive(Debug)]
pub struct LogSubscription {
    pub(crate) id: Uuid,
    pub(crate) key: BuildKey,
    pub(crate) rx: mpsc::Receiver<LogLine>,
    pub(crate) cancel: CancellationToken,
    pub(crate) slots: Arc<DashMap<BuildKey, Slot>>,
}

impl LogSubscription {
    pub fn key(&self) -> &BuildKey {
        &self.key
    }

    /// Next line, or `None` once the build finished and the queue is
    /// empty, or the subscription was superseded.
    pub async fn next(&mut self) -> Option<LogLine> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            line = self.rx.recv() => line,
        }
    }

    /// Whether a newer subscription replaced this one.
    pub fn is_superseded(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Adapt into a `Stream` of lines.
    pub fn into_stream(self) -> impl Stream<Item = LogLine> + Send + 'static {
        futures::stream::unfold(self, |mut sub| async move {
            let line = sub.next().await?;
            Some((line, sub))
        })
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.rx.close();
        if self.slots.remove_if(&self.key, |_, slot| slot.id == self.id).is_some() {
            debug!(build = %self.key, "Log subscriber detached");
        }
    }
}
