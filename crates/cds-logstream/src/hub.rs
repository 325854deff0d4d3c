//! Producer side and subscription registry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use cds_core::config::LogStreamConfig;
use cds_entity::log::{BuildKey, LogLine};

use crate::error::StreamError;
use crate::subscription::LogSubscription;

/// Producer handle on one subscription.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) id: Uuid,
    tx: mpsc::Sender<LogLine>,
    cancel: CancellationToken,
}

/// Live log subscriptions keyed by build.
#[derive(Debug, Clone)]
pub struct LogHub {
    slots: Arc<DashMap<BuildKey, Slot>>,
    buffer_size: usize,
}

impl LogHub {
    /// Create a hub whose queues hold at most `buffer_size` lines.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn from_config(config: &LogStreamConfig) -> Self {
        Self::new(config.buffer_size)
    }

    /// Start reading a build's log from its current tail.
    ///
    /// An existing subscription for the same build is cancelled.
    pub fn subscribe(&self, key: BuildKey) -> LogSubscription {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let slot = Slot {
            id,
            tx,
            cancel: cancel.clone(),
        };
        if let Some(previous) = self.slots.insert(key.clone(), slot) {
            previous.cancel.cancel();
            info!(build = %key, "Log subscription superseded");
        } else {
            debug!(build = %key, "Log subscriber attached");
        }

        LogSubscription {
            id,
            key,
            rx,
            cancel,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Producer for a build.
    pub fn publisher(&self, key: BuildKey) -> LogPublisher {
        LogPublisher {
            hub: self.clone(),
            key,
        }
    }

    pub fn has_subscriber(&self, key: &BuildKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Close a build's stream once queued lines are read. Returns whether
    /// a subscriber was attached.
    ///
    /// A subscriber following the latest build is closed too.
    pub fn finish(&self, key: &BuildKey) -> bool {
        let mut closed = self.slots.remove(key).is_some();
        if !closed && !key.is_latest() {
            closed = self.slots.remove(&key.latest()).is_some();
        }
        if closed {
            debug!(build = %key, "Log stream closed");
        }
        closed
    }

    /// Slot receiving a build's lines: its own subscriber first, then one
    /// following the pipeline's latest build.
    fn route(&self, key: &BuildKey) -> Option<(BuildKey, Slot)> {
        if let Some(slot) = self.slots.get(key) {
            return Some((key.clone(), slot.clone()));
        }
        if key.is_latest() {
            return None;
        }
        let latest = key.latest();
        let slot = self.slots.get(&latest).map(|s| s.clone())?;
        Some((latest, slot))
    }

    pub fn active_subscriptions(&self) -> usize {
        self.slots.len()
    }

    fn detach(&self, key: &BuildKey, id: Uuid) {
        self.slots.remove_if(key, |_, slot| slot.id == id);
    }
}

/// Pushes one build's lines into its subscription.
#[derive(Debug, Clone)]
pub struct LogPublisher {
    hub: LogHub,
    key: BuildKey,
}

impl LogPublisher {
    pub fn key(&self) -> &BuildKey {
        &self.key
    }

    /// Queue a line, waiting while the subscriber's queue is full.
    pub async fn push(&self, line: LogLine) -> Result<(), StreamError> {
        let Some((slot_key, slot)) = self.hub.route(&self.key) else {
            return Err(StreamError::NoSubscriber(self.key.clone()));
        };

        let delivered = tokio::select! {
            biased;
            _ = slot.cancel.cancelled() => false,
            sent = slot.tx.send(line) => sent.is_ok(),
        };

        if delivered {
            Ok(())
        } else {
            self.hub.detach(&slot_key, slot.id);
            Err(StreamError::SubscriberGone(self.key.clone()))
        }
    }

    /// Mark the build terminal.
    pub fn finish(&self) -> bool {
        self.hub.finish(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> BuildKey {
        BuildKey::new("P", "A", "PL", None, 4)
    }

    #[tokio::test]
    async fn test_push_without_subscriber_is_not_buffered() {
        let hub = LogHub::new(4);
        let publisher = hub.publisher(key());
        let err = publisher.push(LogLine::new(1, "build", "early")).await.unwrap_err();
        assert_eq!(err, StreamError::NoSubscriber(key()));

        let mut sub = hub.subscribe(key());
        publisher.push(LogLine::new(2, "build", "late")).await.unwrap();
        assert!(publisher.finish());
        assert_eq!(sub.next().await.unwrap().value, "late");
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_new_subscription_supersedes_previous() {
        let hub = LogHub::new(4);
        let mut first = hub.subscribe(key());
        let mut second = hub.subscribe(key());
        assert!(first.is_superseded());
        assert!(first.next().await.is_none());

        hub.publisher(key()).push(LogLine::new(1, "s", "v")).await.unwrap();
        assert_eq!(second.next().await.unwrap().id, 1);

        drop(first);
        assert!(hub.has_subscriber(&key()), "old subscription must not detach the new one");
    }

    #[tokio::test]
    async fn test_latest_subscriber_follows_running_build() {
        let hub = LogHub::new(4);
        let mut sub = hub.subscribe(key().latest());

        let publisher = hub.publisher(key());
        publisher.push(LogLine::new(1, "build", "running")).await.unwrap();
        assert!(publisher.finish());

        assert_eq!(sub.next().await.unwrap().value, "running");
        assert!(sub.next().await.is_none());
        assert_eq!(hub.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_detaches() {
        let hub = LogHub::new(4);
        let sub = hub.subscribe(key());
        drop(sub);
        assert!(!hub.has_subscriber(&key()));
        assert_eq!(hub.active_subscriptions(), 0);
    }
}
