//! Configuration for deferred teardown
//!
//! Options can be built directly, picked from a preset profile, or loaded
//! from JSON.

use serde::{Deserialize, Serialize};

use crate::MapError;

#[derive(Debug, Clone, PartialEq)]
pub enum TeardownProfile {
    Standard,
    Quiet,
    Verbose,
    Custom(TeardownOptions),
}

impl TeardownProfile {
    pub fn resolve(&self) -> TeardownOptions {
        match self {
            Self::Standard => TeardownOptions::default(),
            Self::Quiet => TeardownOptions {
                warn_on_discard: false,
                log_flush_summary: false,
                unbind_layer_events: true,
            },
            Self::Verbose => TeardownOptions {
                warn_on_discard: true,
                log_flush_summary: true,
                unbind_layer_events: true,
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for TeardownProfile {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeardownOptions {
    /// Log removals dropped with a destroyed engine at warn instead of debug
    pub warn_on_discard: bool,
    /// Emit a debug summary after every non-empty flush
    pub log_flush_summary: bool,
    /// Unbind per-layer interaction listeners before removing a layer
    pub unbind_layer_events: bool,
}

impl Default for TeardownOptions {
    fn default() -> Self {
        Self {
            warn_on_discard: false,
            log_flush_summary: true,
            unbind_layer_events: true,
        }
    }
}

impl TeardownOptions {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
