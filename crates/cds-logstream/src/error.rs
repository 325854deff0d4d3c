//! Log stream errors.

use thiserror::Error;

use cds_core::error::{AppError, ErrorKind};
use cds_entity::log::BuildKey;

/// Why a pushed line was not delivered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// Nobody is subscribed to the build; the line was discarded.
    #[error("no subscriber for build {0}")]
    NoSubscriber(BuildKey),
    /// The subscriber went away or was superseded while the line was queued.
    #[error("subscriber for build {0} disconnected")]
    SubscriberGone(BuildKey),
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        AppError::with_source(ErrorKind::NotFound, err.to_string(), err)
    }
}
