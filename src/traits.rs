//! Seams between the teardown core and the wrapped map engine
//!
//! The engine is an opaque external dependency: the queue only ever asks it
//! to drop things. Markers and popups are owned handles that remove
//! themselves, the rest are addressed by id.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Shared, single-threaded handle to a live engine instance.
pub type SharedEngine = Rc<RefCell<dyn MapEngine>>;

/// Interaction events an engine can deliver for a specific layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerEvent {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseOver,
    MouseOut,
    ContextMenu,
    TouchStart,
    TouchEnd,
    TouchCancel,
}

impl LayerEvent {
    /// Every per-layer event, in the order listeners are unbound.
    pub const ALL: [LayerEvent; 13] = [
        LayerEvent::Click,
        LayerEvent::DblClick,
        LayerEvent::MouseDown,
        LayerEvent::MouseUp,
        LayerEvent::MouseEnter,
        LayerEvent::MouseLeave,
        LayerEvent::MouseMove,
        LayerEvent::MouseOver,
        LayerEvent::MouseOut,
        LayerEvent::ContextMenu,
        LayerEvent::TouchStart,
        LayerEvent::TouchEnd,
        LayerEvent::TouchCancel,
    ];

    /// Engine-side event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerEvent::Click => "click",
            LayerEvent::DblClick => "dblclick",
            LayerEvent::MouseDown => "mousedown",
            LayerEvent::MouseUp => "mouseup",
            LayerEvent::MouseEnter => "mouseenter",
            LayerEvent::MouseLeave => "mouseleave",
            LayerEvent::MouseMove => "mousemove",
            LayerEvent::MouseOver => "mouseover",
            LayerEvent::MouseOut => "mouseout",
            LayerEvent::ContextMenu => "contextmenu",
            LayerEvent::TouchStart => "touchstart",
            LayerEvent::TouchEnd => "touchend",
            LayerEvent::TouchCancel => "touchcancel",
        }
    }
}

impl fmt::Display for LayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations the teardown core needs from a live map engine.
///
/// Implementations report unknown or already-removed ids as errors; the
/// queue logs them and moves on.
pub trait MapEngine {
    /// Unbind every listener for `event` registered on `layer_id`.
    fn off(&mut self, event: LayerEvent, layer_id: &str) -> Result<()>;

    /// Remove a style layer.
    fn remove_layer(&mut self, layer_id: &str) -> Result<()>;

    /// Remove a source. Engines reject this while a layer still reads it.
    fn remove_source(&mut self, source_id: &str) -> Result<()>;

    /// Drop a registered image.
    fn remove_image(&mut self, image_id: &str) -> Result<()>;

    /// Whether the engine instance has been torn down.
    fn is_destroyed(&self) -> bool;

    /// Tear the engine instance down. Called once by the owning service.
    fn destroy(&mut self);
}

/// A marker or popup attached to the map.
pub trait MapHandle {
    /// Identifier used in logs and reports.
    fn id(&self) -> &str;

    /// Detach from the map.
    fn remove(&mut self) -> Result<()>;

    /// Forget close listeners so a later `remove` stays silent.
    fn clear_close_listeners(&mut self) {}
}

impl fmt::Debug for dyn MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapHandle").field(&self.id()).finish()
    }
}
