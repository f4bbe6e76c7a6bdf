//! Execution zone that signals once its synchronous work has settled
//!
//! Work enters the zone through [`Zone::run`]. When the outermost `run`
//! returns, queued microtasks are drained and subscribers are told the zone
//! is stable. This is the "microtask queue emptied" signal the teardown
//! queue flushes on.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::{Callback, QuiescenceTrigger, Subscribers, SubscriptionId};
use crate::core::constants::MAX_MICROTASKS_PER_TURN;

type Microtask = Box<dyn FnOnce()>;

#[derive(Default)]
struct ZoneState {
    depth: Cell<usize>,
    /// Set while microtasks drain and subscribers run
    settling: Cell<bool>,
    /// A turn ended while settling; another signal is owed
    dirty: Cell<bool>,
    microtasks: RefCell<VecDeque<Microtask>>,
    stable_signals: Cell<u64>,
}

#[derive(Clone, Default)]
pub struct Zone {
    state: Rc<ZoneState>,
    subscribers: Subscribers,
}

/// Keeps `depth` balanced even if the work inside a turn panics.
struct TurnGuard<'a>(&'a ZoneState);

impl<'a> TurnGuard<'a> {
    fn enter(state: &'a ZoneState) -> Self {
        state.depth.set(state.depth.get() + 1);
        Self(state)
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.depth.set(self.0.depth.get() - 1);
    }
}

/// Clears the settling flags on every exit from the settle loop, unwinding
/// included.
struct SettleGuard<'a>(&'a ZoneState);

impl<'a> SettleGuard<'a> {
    fn enter(state: &'a ZoneState) -> Self {
        state.settling.set(true);
        Self(state)
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        self.0.dirty.set(false);
        self.0.settling.set(false);
    }
}

impl Zone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` inside the zone.
    ///
    /// Nested calls are part of the same turn. Leaving the outermost call
    /// drains microtasks and signals stability.
    pub fn run<R>(&self, work: impl FnOnce() -> R) -> R {
        let output = {
            let _turn = TurnGuard::enter(&self.state);
            work()
        };
        if self.state.depth.get() == 0 {
            self.settle();
        }
        output
    }

    /// Queues `task` to run after the current turn's synchronous work.
    ///
    /// Outside any turn the task starts a turn of its own and runs
    /// immediately.
    pub fn schedule_microtask(&self, task: impl FnOnce() + 'static) {
        self.state.microtasks.borrow_mut().push_back(Box::new(task));
        if self.state.depth.get() == 0 && !self.state.settling.get() {
            self.settle();
        }
    }

    /// True when no turn is running and no microtask is queued.
    pub fn is_stable(&self) -> bool {
        self.state.depth.get() == 0
            && !self.state.settling.get()
            && self.state.microtasks.borrow().is_empty()
    }

    /// Number of stability signals delivered so far.
    pub fn stable_signals(&self) -> u64 {
        self.state.stable_signals.get()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.state.microtasks.borrow().len()
    }

    fn settle(&self) {
        if self.state.settling.get() {
            // A subscriber started a turn; the running settle loop owes
            // another signal
            self.state.dirty.set(true);
            return;
        }
        let _settling = SettleGuard::enter(&self.state);

        let mut drained = 0usize;
        loop {
            self.state.dirty.set(false);
            while let Some(task) = self.next_microtask() {
                let _turn = TurnGuard::enter(&self.state);
                task();
                drained += 1;
                if drained >= MAX_MICROTASKS_PER_TURN {
                    log::warn!(
                        "zone drained {} microtasks without settling, signalling anyway",
                        drained
                    );
                    break;
                }
            }

            self.state
                .stable_signals
                .set(self.state.stable_signals.get() + 1);
            self.subscribers.notify();

            let more = self.state.dirty.get() || self.pending_microtasks() > 0;
            if !more || drained >= MAX_MICROTASKS_PER_TURN {
                break;
            }
        }
    }

    fn next_microtask(&self) -> Option<Microtask> {
        self.state.microtasks.borrow_mut().pop_front()
    }
}

impl QuiescenceTrigger for Zone {
    fn subscribe(&self, callback: Callback) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("depth", &self.state.depth.get())
            .field("pending_microtasks", &self.pending_microtasks())
            .field("stable_signals", &self.stable_signals())
            .finish()
    }
}
