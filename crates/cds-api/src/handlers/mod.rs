//! Route handlers organized by domain.

pub mod build;
pub mod health;
pub mod notification;
