//! # cds-notification
//!
//! Build-event notification routing. A build status transition for a
//! scope is evaluated against the scope's stored settings; every kind that
//! fires gets its template rendered and is posted to the backend the
//! [`NotificationRegistry`] holds for it.
//!
//! Nothing in this crate reports a notification failure back to the
//! pipeline: [`BuildNotifier::notify`] is fire-and-forget and failures are
//! isolated per kind.

pub mod directory;
pub mod dispatcher;
pub mod listener;
pub mod notifier;
pub mod registry;
pub mod template;
pub mod trigger;

pub use directory::{RecipientDirectory, StaticDirectory};
pub use dispatcher::{DispatchError, Dispatcher};
pub use listener::{BuildTransition, spawn_event_listener, transition_channel};
pub use notifier::{BuildNotifier, DispatchOutcome, DispatchReport};
pub use registry::NotificationRegistry;
pub use template::{TemplateContext, TemplateError};
