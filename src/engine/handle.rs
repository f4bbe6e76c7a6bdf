//! Marker and popup handles for the in-memory engine

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::memory::CallLog;
use crate::traits::MapHandle;
use crate::{MapError, Result};

type RemoveHook = Box<dyn FnMut(&str)>;

/// A marker or popup living in a [`super::MemoryEngine`].
///
/// Removal state is shared between clones, so a test can hand one clone to
/// the queue and keep another to observe it.
#[derive(Clone)]
pub struct MemoryHandle {
    label: &'static str,
    id: String,
    removed: Rc<Cell<bool>>,
    close_listeners: Rc<Cell<usize>>,
    on_remove: Rc<RefCell<Option<RemoveHook>>>,
    calls: CallLog,
}

impl MemoryHandle {
    pub(crate) fn with_log(label: &'static str, id: &str, calls: CallLog) -> Self {
        Self {
            label,
            id: id.to_string(),
            removed: Rc::default(),
            close_listeners: Rc::default(),
            on_remove: Rc::default(),
            calls,
        }
    }

    /// A standalone marker with its own call log.
    pub fn marker(id: &str) -> Self {
        Self::with_log("marker", id, CallLog::default())
    }

    /// A standalone popup with its own call log.
    pub fn popup(id: &str) -> Self {
        Self::with_log("popup", id, CallLog::default())
    }

    /// Registers a close listener; each fires once when the handle is removed.
    pub fn on_close(&self) {
        self.close_listeners.set(self.close_listeners.get() + 1);
    }

    /// Runs `hook` after a successful removal.
    pub fn on_remove(&self, hook: impl FnMut(&str) + 'static) {
        *self.on_remove.borrow_mut() = Some(Box::new(hook));
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub fn close_listeners(&self) -> usize {
        self.close_listeners.get()
    }

    pub fn boxed(&self) -> Box<dyn MapHandle> {
        Box::new(self.clone())
    }
}

impl MapHandle for MemoryHandle {
    fn id(&self) -> &str {
        &self.id
    }

    fn remove(&mut self) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("remove_{} {}", self.label, self.id));
        if self.removed.replace(true) {
            return Err(MapError::HandleRemoved(self.id.clone()).into());
        }
        for _ in 0..self.close_listeners.replace(0) {
            self.calls
                .borrow_mut()
                .push(format!("close {} {}", self.label, self.id));
        }
        // Take the hook out so it may enqueue or re-register freely
        let hook = self.on_remove.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(&self.id);
            let mut slot = self.on_remove.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
        Ok(())
    }

    fn clear_close_listeners(&mut self) {
        self.close_listeners.set(0);
    }
}

impl fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHandle")
            .field("kind", &self.label)
            .field("id", &self.id)
            .field("removed", &self.removed.get())
            .finish()
    }
}
