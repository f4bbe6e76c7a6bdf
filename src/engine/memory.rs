//! In-memory map engine that records every call it receives

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};

use super::handle::MemoryHandle;
use crate::traits::{LayerEvent, MapEngine};
use crate::{MapError, Result};

/// Ordered record of engine and handle calls, shared between an engine
/// and the handles it creates.
pub type CallLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Default)]
pub struct MemoryEngine {
    /// Layer id -> source it reads from
    layers: FxHashMap<String, Option<String>>,
    sources: FxHashSet<String>,
    images: FxHashSet<String>,
    listeners: FxHashMap<String, FxHashMap<LayerEvent, usize>>,
    /// Events whose `off` calls are rejected
    failing_unbinds: FxHashSet<LayerEvent>,
    calls: CallLog,
    destroyed: bool,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer_id: &str, source_id: Option<&str>) {
        self.layers
            .insert(layer_id.to_string(), source_id.map(str::to_string));
    }

    pub fn add_source(&mut self, source_id: &str) {
        self.sources.insert(source_id.to_string());
    }

    pub fn add_image(&mut self, image_id: &str) {
        self.images.insert(image_id.to_string());
    }

    /// Registers a listener for `event` on a layer.
    pub fn on(&mut self, event: LayerEvent, layer_id: &str) {
        *self
            .listeners
            .entry(layer_id.to_string())
            .or_default()
            .entry(event)
            .or_insert(0) += 1;
    }

    /// Makes every later `off` call for `event` fail.
    pub fn fail_unbind(&mut self, event: LayerEvent) {
        self.failing_unbinds.insert(event);
    }

    /// A marker that logs into this engine's call log.
    pub fn marker(&self, id: &str) -> MemoryHandle {
        MemoryHandle::with_log("marker", id, self.calls.clone())
    }

    /// A popup that logs into this engine's call log.
    pub fn popup(&self, id: &str) -> MemoryHandle {
        MemoryHandle::with_log("popup", id, self.calls.clone())
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    pub fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains(source_id)
    }

    pub fn has_image(&self, image_id: &str) -> bool {
        self.images.contains(image_id)
    }

    pub fn listener_count(&self, layer_id: &str) -> usize {
        self.listeners
            .get(layer_id)
            .map(|events| events.values().sum())
            .unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn clear_calls(&mut self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(MapError::EngineDestroyed.into());
        }
        Ok(())
    }
}

impl MapEngine for MemoryEngine {
    fn off(&mut self, event: LayerEvent, layer_id: &str) -> Result<()> {
        self.ensure_alive()?;
        self.record(format!("off {} {}", event, layer_id));
        if self.failing_unbinds.contains(&event) {
            return Err(MapError::UnbindFailed {
                event,
                layer_id: layer_id.to_string(),
            }
            .into());
        }
        if let Some(events) = self.listeners.get_mut(layer_id) {
            events.remove(&event);
            if events.is_empty() {
                self.listeners.remove(layer_id);
            }
        }
        Ok(())
    }

    fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.ensure_alive()?;
        self.record(format!("remove_layer {}", layer_id));
        self.layers
            .remove(layer_id)
            .map(|_| ())
            .ok_or_else(|| MapError::UnknownLayer(layer_id.to_string()).into())
    }

    fn remove_source(&mut self, source_id: &str) -> Result<()> {
        self.ensure_alive()?;
        self.record(format!("remove_source {}", source_id));
        if !self.sources.contains(source_id) {
            return Err(MapError::UnknownSource(source_id.to_string()).into());
        }
        let reader = self
            .layers
            .iter()
            .find(|(_, source)| source.as_deref() == Some(source_id))
            .map(|(layer, _)| layer.clone());
        if let Some(layer_id) = reader {
            return Err(MapError::SourceInUse {
                source_id: source_id.to_string(),
                layer_id,
            }
            .into());
        }
        self.sources.remove(source_id);
        Ok(())
    }

    fn remove_image(&mut self, image_id: &str) -> Result<()> {
        self.ensure_alive()?;
        self.record(format!("remove_image {}", image_id));
        if self.images.remove(image_id) {
            Ok(())
        } else {
            Err(MapError::UnknownImage(image_id.to_string()).into())
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.record("destroy".to_string());
            self.destroyed = true;
            self.layers.clear();
            self.sources.clear();
            self.images.clear();
            self.listeners.clear();
        }
    }
}
