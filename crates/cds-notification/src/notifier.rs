//! Load → evaluate → render → dispatch for one build transition.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span, warn};

use cds_core::result::AppResult;
use cds_database::NotificationStore;
use cds_entity::build::BuildStatusEvent;
use cds_entity::notification::NotificationKind;
use cds_entity::scope::Scope;

use crate::directory::{RecipientDirectory, resolve_recipients};
use crate::dispatcher::Dispatcher;
use crate::template::{TemplateContext, render_lossy};
use crate::trigger;

/// Result of one kind's dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Failed(String),
}

/// Per-kind outcomes of processing one transition. Kinds that did not
/// fire are absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub outcomes: BTreeMap<NotificationKind, DispatchOutcome>,
}

impl DispatchReport {
    pub fn sent(&self) -> impl Iterator<Item = NotificationKind> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| **o == DispatchOutcome::Sent)
            .map(|(k, _)| *k)
    }

    pub fn failed(&self) -> impl Iterator<Item = NotificationKind> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DispatchOutcome::Failed(_)))
            .map(|(k, _)| *k)
    }
}

/// Routes build transitions to the notification backends configured for
/// their scope.
#[derive(Debug, Clone)]
pub struct BuildNotifier {
    store: Arc<dyn NotificationStore>,
    dispatcher: Dispatcher,
    directory: Arc<dyn RecipientDirectory>,
}

impl BuildNotifier {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        dispatcher: Dispatcher,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            directory,
        }
    }

    /// Process a transition and wait for every dispatch to settle.
    ///
    /// Only a store failure is returned as an error. Template and dispatch
    /// failures are logged and recorded per kind.
    pub async fn process(&self, scope: &Scope, event: &BuildStatusEvent) -> AppResult<DispatchReport> {
        let Some(set) = self.store.load(scope).await? else {
            debug!(%scope, "No notification configured");
            return Ok(DispatchReport::default());
        };

        let fired = trigger::evaluate(&set, event);
        if fired.is_empty() {
            debug!(%scope, status = %event.current_status, "No notification fired");
            return Ok(DispatchReport::default());
        }

        let ctx = TemplateContext::new(&event.context, self.dispatcher.registry().base_url());

        let sends = fired.into_iter().map(|(kind, settings)| {
            let ctx = &ctx;
            async move {
                let subject = render_lossy(&settings.template().subject, ctx);
                let body = render_lossy(&settings.template().body, ctx);
                let recipients =
                    resolve_recipients(settings, scope, event, self.directory.as_ref()).await;

                let outcome = match self.dispatcher.send(kind, &subject, &body, &recipients).await {
                    Ok(()) => DispatchOutcome::Sent,
                    Err(e) => {
                        warn!(%scope, %kind, error = %e, "Notification dispatch failed");
                        DispatchOutcome::Failed(e.to_string())
                    }
                };
                (kind, outcome)
            }
        });

        let outcomes = join_all(sends).await.into_iter().collect();
        Ok(DispatchReport { outcomes })
    }

    /// Process a transition in the background. Never reports back.
    pub fn notify(self: &Arc<Self>, scope: Scope, event: BuildStatusEvent) -> JoinHandle<()> {
        let notifier = Arc::clone(self);
        let span = info_span!(
            "notify",
            %scope,
            status = %event.current_status,
            build = event.context.build_number
        );
        tokio::spawn(
            async move {
                match notifier.process(&scope, &event).await {
                    Ok(report) => debug!(
                        sent = report.sent().count(),
                        failed = report.failed().count(),
                        "Transition processed"
                    ),
                    Err(e) => error!(error = %e, "Cannot load notification settings"),
                }
            }
            .instrument(span),
        )
    }
}
