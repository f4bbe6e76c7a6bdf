//! In-memory map engine
//!
//! Tracks layers, sources, images and per-layer listeners with the same
//! rejection rules a real engine applies, and records every call in order.
//! Used by the headless demo and throughout the tests.

pub mod handle;
pub mod memory;

pub use handle::MemoryHandle;
pub use memory::{CallLog, MemoryEngine};
