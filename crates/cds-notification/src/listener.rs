//! Queue between the pipeline engine and the notifier.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cds_entity::build::BuildStatusEvent;
use cds_entity::scope::Scope;

use crate::notifier::BuildNotifier;

/// A status transition raised for a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTransition {
    pub scope: Scope,
    pub event: BuildStatusEvent,
}

/// Create the transition queue.
pub fn transition_channel(
    capacity: usize,
) -> (mpsc::Sender<BuildTransition>, mpsc::Receiver<BuildTransition>) {
    mpsc::channel(capacity.max(1))
}

/// Hand every received transition to the notifier until the queue closes
/// or `shutdown` fires. Each transition is processed on its own task.
pub fn spawn_event_listener(
    notifier: Arc<BuildNotifier>,
    mut rx: mpsc::Receiver<BuildTransition>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Build transition listener started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                next = rx.recv() => match next {
                    Some(transition) => {
                        debug!(scope = %transition.scope, status = %transition.event.current_status, "Transition received");
                        notifier.notify(transition.scope, transition.event);
                    }
                    None => break,
                },
            }
        }
        info!("Build transition listener stopped");
    })
}
