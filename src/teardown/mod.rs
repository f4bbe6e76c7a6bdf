//! Deferred removal of map resources
//!
//! Removal requests are appended to a [`queue::RemovalQueue`] as tagged
//! entries and torn down together when the host reaches quiescence.

pub mod kind;
pub mod queue;
pub mod report;

pub use kind::{RemovalKind, RemovalTarget};
pub use queue::RemovalQueue;
pub use report::{FlushReport, RemovalFailure};
