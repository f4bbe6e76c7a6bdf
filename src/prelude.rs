//! Prelude module for common mapservice types and traits
//!
//! `use mapservice::prelude::*;` brings in the service, the queue, the
//! trigger implementations and the engine seams.

pub use crate::core::{
    config::{TeardownOptions, TeardownProfile},
    service::MapService,
};

pub use crate::teardown::{FlushReport, RemovalFailure, RemovalKind, RemovalQueue, RemovalTarget};

pub use crate::runtime::{Callback, ManualTicker, QuiescenceTrigger, SubscriptionId, Zone};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::IdleTicker;

pub use crate::engine::{MemoryEngine, MemoryHandle};

pub use crate::traits::{LayerEvent, MapEngine, MapHandle, SharedEngine};

pub use crate::{Error as MapError, Result};

pub use std::{cell::RefCell, rc::Rc};
