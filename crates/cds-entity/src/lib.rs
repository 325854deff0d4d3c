//! # cds-entity
//!
//! Domain models for the CDS notification engine. Every struct in this
//! crate represents a database row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and the storage
//! row additionally derives `sqlx::FromRow`.

pub mod build;
pub mod log;
pub mod notification;
pub mod scope;

pub use build::{BuildContext, BuildStatus, BuildStatusEvent};
pub use log::{BuildKey, LogLine};
pub use notification::{
    JabberEmailSettings, NotificationKind, NotificationRow, NotificationSet, NotificationSettings,
    NotificationTemplate, TatSettings,
};
pub use scope::{NO_ENVIRONMENT_ID, NO_ENVIRONMENT_NAME, Scope};
