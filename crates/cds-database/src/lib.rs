//! # cds-database
//!
//! Persistence for per-scope notification settings. [`NotificationStore`]
//! is the contract; [`NotificationRepository`] backs it with PostgreSQL
//! and [`MemoryNotificationStore`] keeps everything in process.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryNotificationStore;
pub use repositories::NotificationRepository;
pub use store::NotificationStore;
