//! Tokio-driven idle ticker
//!
//! Ticks a [`ManualTicker`] on a fixed period from a task on the current
//! tokio `LocalSet`, standing in for a host idle callback.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ManualTicker;
use crate::core::constants::DEFAULT_IDLE_TICK_INTERVAL;

/// Handle to a running idle ticker. Dropping it stops the ticks.
#[derive(Debug)]
pub struct IdleTicker {
    ticker: ManualTicker,
    handle: JoinHandle<()>,
}

impl IdleTicker {
    /// Starts ticking `ticker` every `period`.
    ///
    /// The first tick is delivered as soon as the task is first polled.
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn spawn(ticker: ManualTicker, period: Duration) -> Self {
        let driven = ticker.clone();
        let handle = tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                driven.tick();
            }
        });
        log::debug!("idle ticker started with period {:?}", period);
        Self { ticker, handle }
    }

    /// Starts ticking with [`DEFAULT_IDLE_TICK_INTERVAL`].
    pub fn spawn_default(ticker: ManualTicker) -> Self {
        Self::spawn(ticker, DEFAULT_IDLE_TICK_INTERVAL)
    }

    pub fn ticker(&self) -> &ManualTicker {
        &self.ticker
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for IdleTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
