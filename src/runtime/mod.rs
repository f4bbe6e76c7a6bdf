//! Quiescence triggers
//!
//! A trigger tells its subscribers "the current burst of synchronous work
//! has finished". The teardown queue only ever sees the
//! [`QuiescenceTrigger`] trait, so it runs the same under a host event
//! loop, a tokio `LocalSet` or a test stepping by hand.
//!
//! Everything here is single-threaded: state lives in `Rc<RefCell<..>>` and
//! subscriber callbacks are not `Send`.

pub mod manual;
pub mod zone;

#[cfg(feature = "tokio-runtime")]
pub mod idle;

use std::cell::RefCell;
use std::rc::Rc;

pub use manual::ManualTicker;
pub use zone::Zone;

#[cfg(feature = "tokio-runtime")]
pub use idle::IdleTicker;

/// Callback invoked once per quiescence signal.
pub type Callback = Box<dyn FnMut()>;

/// Token returned by [`QuiescenceTrigger::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Anything that can announce "no more synchronous work pending".
pub trait QuiescenceTrigger {
    /// Registers `callback` to run on every signal from now on.
    fn subscribe(&self, callback: Callback) -> SubscriptionId;

    /// Stops delivering signals to a subscriber. Returns false if the id was
    /// unknown or already unsubscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct SubscriberState {
    next_id: u64,
    /// A `None` slot belongs to a callback that is currently running
    entries: Vec<(SubscriptionId, Option<Callback>)>,
}

/// Subscriber bookkeeping shared by the trigger implementations.
///
/// No borrow is held while a callback runs, so callbacks may subscribe,
/// unsubscribe (themselves included) or fire other triggers.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    state: Rc<RefCell<SubscriberState>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.entries.push((id, Some(callback)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.entries.len();
        state.entries.retain(|(entry, _)| *entry != id);
        state.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Runs every callback subscribed before the call, once.
    pub(crate) fn notify(&self) {
        let ids: Vec<SubscriptionId> = self
            .state
            .borrow()
            .entries
            .iter()
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let callback = self.slot(id).and_then(|mut slot| slot.take());
            let Some(mut callback) = callback else {
                continue;
            };
            callback();
            // Dropped here if the callback unsubscribed itself
            if let Some(mut slot) = self.slot(id) {
                *slot = Some(callback);
            }
        }
    }

    fn slot(&self, id: SubscriptionId) -> Option<std::cell::RefMut<'_, Option<Callback>>> {
        let state = self.state.borrow_mut();
        std::cell::RefMut::filter_map(state, |state| {
            state
                .entries
                .iter_mut()
                .find(|(entry, _)| *entry == id)
                .map(|(_, callback)| callback)
        })
        .ok()
    }
}
