//! # cds-api
//!
//! HTTP surface of the notification engine built on Axum: notification
//! settings per scope, build status transitions, and build log ingest and
//! streaming.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, open_store, run_server, shutdown_signal};
pub use error::ApiError;
pub use state::AppState;
