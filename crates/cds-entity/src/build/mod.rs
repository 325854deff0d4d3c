//! Build status transitions and the context they carry.

pub mod context;
pub mod event;
pub mod status;

pub use context::BuildContext;
pub use event::BuildStatusEvent;
pub use status::BuildStatus;
