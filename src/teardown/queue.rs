//! Tagged-entry removal queue and its flush protocol

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::kind::{RemovalKind, RemovalTarget};
use super::report::FlushReport;
use crate::core::config::TeardownOptions;
use crate::traits::{LayerEvent, MapEngine, MapHandle, SharedEngine};
use crate::{MapError, Result};

/// Pending removals shared by every clone of the queue.
///
/// Enqueueing is a plain append. [`RemovalQueue::flush`] drains a snapshot
/// of everything pending, so anything enqueued while a flush is running
/// waits for the next one.
#[derive(Clone, Default)]
pub struct RemovalQueue {
    pending: Rc<RefCell<Vec<RemovalTarget>>>,
    options: Rc<TeardownOptions>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TeardownOptions) -> Self {
        Self {
            pending: Rc::default(),
            options: Rc::new(options),
        }
    }

    pub fn options(&self) -> &TeardownOptions {
        &self.options
    }

    /// Appends a removal. Never fails and never deduplicates.
    pub fn enqueue(&self, target: RemovalTarget) {
        log::trace!("queued removal of {}", target);
        self.pending.borrow_mut().push(target);
    }

    pub fn remove_layer(&self, layer_id: impl Into<String>) {
        self.enqueue(RemovalTarget::Layer(layer_id.into()));
    }

    pub fn remove_source(&self, source_id: impl Into<String>) {
        self.enqueue(RemovalTarget::Source(source_id.into()));
    }

    pub fn remove_marker(&self, marker: Box<dyn MapHandle>) {
        self.enqueue(RemovalTarget::Marker(marker));
    }

    pub fn remove_popup(&self, popup: Box<dyn MapHandle>) {
        self.enqueue(RemovalTarget::Popup(popup));
    }

    pub fn remove_image(&self, image_id: impl Into<String>) {
        self.enqueue(RemovalTarget::Image(image_id.into()));
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Number of pending entries of one kind.
    pub fn pending_of(&self, kind: RemovalKind) -> usize {
        self.pending
            .borrow()
            .iter()
            .filter(|t| t.kind() == kind)
            .count()
    }

    /// Ids of pending entries in the order a flush would visit them.
    pub fn pending_ids(&self) -> Vec<(RemovalKind, String)> {
        let mut ids: Vec<_> = self
            .pending
            .borrow()
            .iter()
            .map(|t| (t.kind(), t.id().to_string()))
            .collect();
        ids.sort_by_key(|(kind, _)| *kind);
        ids
    }

    /// Drops everything pending without touching the engine.
    pub fn discard(&self) -> usize {
        let dropped = std::mem::take(&mut *self.pending.borrow_mut());
        let count = dropped.len();
        if count > 0 {
            if self.options.warn_on_discard {
                log::warn!("discarding {} pending removals, map engine is gone", count);
            } else {
                log::debug!("discarding {} pending removals, map engine is gone", count);
            }
        }
        count
    }

    /// Flush against an engine the caller does not own.
    ///
    /// A dropped engine counts as destroyed.
    pub fn flush_weak(&self, engine: &Weak<RefCell<dyn MapEngine>>) -> FlushReport {
        match engine.upgrade() {
            Some(engine) => self.flush(&engine),
            None => FlushReport::skipped(self.discard()),
        }
    }

    /// Tears down every pending entry: layers, sources, markers, popups,
    /// images, each in insertion order.
    ///
    /// Per-entry failures are logged and collected in the report. If the
    /// engine is destroyed nothing is attempted and the pending entries are
    /// discarded. If the engine is borrowed elsewhere the batch stays
    /// pending and the report is marked deferred.
    pub fn flush(&self, engine: &SharedEngine) -> FlushReport {
        let destroyed = match engine.try_borrow_mut() {
            Ok(engine) => engine.is_destroyed(),
            Err(_) => {
                log::debug!("map engine is busy, deferring {} removals", self.len());
                return FlushReport::deferred();
            }
        };
        if destroyed {
            return FlushReport::skipped(self.discard());
        }

        let mut batch = std::mem::take(&mut *self.pending.borrow_mut());
        if batch.is_empty() {
            return FlushReport::default();
        }

        // Stable, so insertion order survives within a kind
        batch.sort_by_key(RemovalTarget::kind);

        let mut report = FlushReport::default();
        for mut target in batch {
            let kind = target.kind();
            report.record_attempt(kind);
            if let Err(e) = self.tear_down(engine, &mut target, &mut report) {
                log::warn!("failed to remove {}: {}", target, e);
                report.record_failure(kind, target.id(), e.to_string());
            }
        }

        if self.options.log_flush_summary {
            log::debug!(
                "flushed {} removals ({} failed), {} queued meanwhile",
                report.total_attempted(),
                report.failures.len(),
                self.len()
            );
        }
        report
    }

    fn tear_down(
        &self,
        engine: &SharedEngine,
        target: &mut RemovalTarget,
        report: &mut FlushReport,
    ) -> Result<()> {
        log::trace!("removing {}", target);
        match target {
            RemovalTarget::Layer(layer_id) => {
                let mut engine = engine.try_borrow_mut().map_err(|_| MapError::EngineBusy)?;
                if self.options.unbind_layer_events {
                    for event in LayerEvent::ALL {
                        if let Err(e) = engine.off(event, layer_id) {
                            log::warn!("failed to unbind {} on layer {}: {}", event, layer_id, e);
                            report.record_unbind_failure(layer_id, format!("{}: {}", event, e));
                        }
                    }
                }
                engine.remove_layer(layer_id)
            }
            RemovalTarget::Source(source_id) => engine
                .try_borrow_mut()
                .map_err(|_| MapError::EngineBusy)?
                .remove_source(source_id),
            RemovalTarget::Image(image_id) => engine
                .try_borrow_mut()
                .map_err(|_| MapError::EngineBusy)?
                .remove_image(image_id),
            RemovalTarget::Marker(handle) | RemovalTarget::Popup(handle) => handle.remove(),
        }
    }
}

impl fmt::Debug for RemovalQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemovalQueue")
            .field("pending", &self.len())
            .field("options", &self.options)
            .finish()
    }
}
