//! Removal kinds and the tagged entries the queue stores

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::MapHandle;

/// Resource category of a queued removal.
///
/// Declaration order is flush order: layers detach before the sources they
/// read from, and visual handles go last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalKind {
    Layer,
    Source,
    Marker,
    Popup,
    Image,
}

impl RemovalKind {
    pub const FLUSH_ORDER: [RemovalKind; 5] = [
        RemovalKind::Layer,
        RemovalKind::Source,
        RemovalKind::Marker,
        RemovalKind::Popup,
        RemovalKind::Image,
    ];

    /// Position of this kind within a flush.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RemovalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalKind::Layer => write!(f, "layer"),
            RemovalKind::Source => write!(f, "source"),
            RemovalKind::Marker => write!(f, "marker"),
            RemovalKind::Popup => write!(f, "popup"),
            RemovalKind::Image => write!(f, "image"),
        }
    }
}

/// One pending removal.
#[derive(Debug)]
pub enum RemovalTarget {
    Layer(String),
    Source(String),
    Marker(Box<dyn MapHandle>),
    Popup(Box<dyn MapHandle>),
    Image(String),
}

impl RemovalTarget {
    pub fn kind(&self) -> RemovalKind {
        match self {
            RemovalTarget::Layer(_) => RemovalKind::Layer,
            RemovalTarget::Source(_) => RemovalKind::Source,
            RemovalTarget::Marker(_) => RemovalKind::Marker,
            RemovalTarget::Popup(_) => RemovalKind::Popup,
            RemovalTarget::Image(_) => RemovalKind::Image,
        }
    }

    /// Id of the targeted resource, or the handle's own id.
    pub fn id(&self) -> &str {
        match self {
            RemovalTarget::Layer(id) | RemovalTarget::Source(id) | RemovalTarget::Image(id) => id,
            RemovalTarget::Marker(handle) | RemovalTarget::Popup(handle) => handle.id(),
        }
    }
}

impl fmt::Display for RemovalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}
