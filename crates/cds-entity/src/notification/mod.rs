//! Notification configuration entities.

pub mod kind;
pub mod row;
pub mod set;
pub mod settings;

pub use kind::NotificationKind;
pub use row::NotificationRow;
pub use set::NotificationSet;
pub use settings::{JabberEmailSettings, NotificationSettings, NotificationTemplate, TatSettings};
