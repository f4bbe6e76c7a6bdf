//! Map service: the owner-facing removal API wired to a quiescence trigger

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{
    core::config::TeardownOptions,
    runtime::{QuiescenceTrigger, SubscriptionId},
    teardown::{FlushReport, RemovalQueue},
    traits::{MapHandle, SharedEngine},
};

/// Owns the removal queue for one map and wires it to an engine and a
/// quiescence trigger.
///
/// Removal requests return immediately; the engine sees them on the next
/// trigger signal. The engine handle is held weakly by the flush callback,
/// so dropping it elsewhere makes pending removals a no-op.
pub struct MapService {
    engine: SharedEngine,
    queue: RemovalQueue,
    trigger: Box<dyn QuiescenceTrigger>,
    subscription: Cell<Option<SubscriptionId>>,
    last_report: Rc<RefCell<Option<FlushReport>>>,
}

impl MapService {
    pub fn new(
        engine: SharedEngine,
        trigger: impl QuiescenceTrigger + 'static,
        options: TeardownOptions,
    ) -> Self {
        let queue = RemovalQueue::with_options(options);
        let last_report = Rc::new(RefCell::new(None));

        let subscription = {
            let queue = queue.clone();
            let engine = Rc::downgrade(&engine);
            let last_report = last_report.clone();
            trigger.subscribe(Box::new(move || {
                let report = queue.flush_weak(&engine);
                if !report.is_empty() {
                    *last_report.borrow_mut() = Some(report);
                }
            }))
        };

        Self {
            engine,
            queue,
            trigger: Box::new(trigger),
            subscription: Cell::new(Some(subscription)),
            last_report,
        }
    }

    pub fn with_defaults(engine: SharedEngine, trigger: impl QuiescenceTrigger + 'static) -> Self {
        Self::new(engine, trigger, TeardownOptions::default())
    }

    pub fn remove_layer(&self, layer_id: impl Into<String>) {
        self.queue.remove_layer(layer_id);
    }

    pub fn remove_source(&self, source_id: impl Into<String>) {
        self.queue.remove_source(source_id);
    }

    pub fn remove_marker(&self, marker: Box<dyn MapHandle>) {
        self.queue.remove_marker(marker);
    }

    /// Queues a popup for removal. With `skip_close_event` its close
    /// listeners are dropped right away, so the deferred removal is silent.
    pub fn remove_popup_from_map(&self, mut popup: Box<dyn MapHandle>, skip_close_event: bool) {
        if skip_close_event {
            popup.clear_close_listeners();
        }
        self.queue.remove_popup(popup);
    }

    pub fn remove_image(&self, image_id: impl Into<String>) {
        self.queue.remove_image(image_id);
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Handle for enqueueing from teardown callbacks.
    pub fn queue(&self) -> RemovalQueue {
        self.queue.clone()
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Report of the most recent flush that had work to do.
    pub fn last_flush_report(&self) -> Option<FlushReport> {
        self.last_report.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.subscription.get().is_none()
    }

    /// Tears the map down: stops listening for quiescence, destroys the
    /// engine and discards every pending removal. Safe to call twice.
    pub fn destroy_map(&self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        self.trigger.unsubscribe(subscription);

        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.destroy(),
            Err(_) => log::warn!("map engine busy during destroy, leaving it to its owner"),
        }

        let discarded = self.queue.discard();
        log::debug!("map destroyed, {} pending removals dropped", discarded);
    }
}

impl Drop for MapService {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.trigger.unsubscribe(subscription);
        }
    }
}

impl std::fmt::Debug for MapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapService")
            .field("queue", &self.queue)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
