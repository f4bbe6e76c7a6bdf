//! Trigger stepped by hand, for tests and hosts with their own loop

use std::cell::Cell;
use std::rc::Rc;

use super::{Callback, QuiescenceTrigger, Subscribers, SubscriptionId};

/// A trigger that fires only when told to.
///
/// Each [`ManualTicker::tick`] is one quiescence signal. Clones share
/// subscribers and the tick counter.
#[derive(Clone, Default)]
pub struct ManualTicker {
    subscribers: Subscribers,
    ticks: Rc<Cell<u64>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals quiescence once to every current subscriber.
    pub fn tick(&self) {
        self.ticks.set(self.ticks.get() + 1);
        self.subscribers.notify();
    }

    /// Number of ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl QuiescenceTrigger for ManualTicker {
    fn subscribe(&self, callback: Callback) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl std::fmt::Debug for ManualTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTicker")
            .field("ticks", &self.ticks())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
