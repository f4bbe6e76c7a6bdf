//! # mapservice
//!
//! Deferred teardown for an interactive map engine.
//!
//! Removal requests for layers, sources, markers, popups and images are
//! buffered in a [`RemovalQueue`] and applied in one batch each time the
//! host reports quiescence through a [`QuiescenceTrigger`]. The map engine
//! itself is opaque and reached only through the [`MapEngine`] and
//! [`MapHandle`] traits.

pub mod core;
pub mod engine;
pub mod prelude;
pub mod runtime;
pub mod teardown;
pub mod traits;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{TeardownOptions, TeardownProfile},
    service::MapService,
};

pub use crate::engine::{MemoryEngine, MemoryHandle};

pub use crate::runtime::{ManualTicker, QuiescenceTrigger, SubscriptionId, Zone};

pub use crate::teardown::{
    kind::{RemovalKind, RemovalTarget},
    queue::RemovalQueue,
    report::{FlushReport, RemovalFailure},
};

pub use crate::traits::{LayerEvent, MapEngine, MapHandle, SharedEngine};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Unknown image: {0}")]
    UnknownImage(String),

    #[error("Source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },

    #[error("Could not unbind {event} listeners on layer {layer_id}")]
    UnbindFailed {
        event: crate::traits::LayerEvent,
        layer_id: String,
    },

    #[error("Handle {0} was already removed")]
    HandleRemoved(String),

    #[error("Map engine has been destroyed")]
    EngineDestroyed,

    #[error("Map engine is busy")]
    EngineBusy,
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` honouring `RUST_LOG`. Later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder().format_timestamp_millis().try_init();
}
