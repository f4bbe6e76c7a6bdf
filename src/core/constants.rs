//! Engine-wide defaults for the teardown scheduler.

use std::time::Duration;

/// Period of the idle ticker when none is given (one 60 Hz frame).
pub const DEFAULT_IDLE_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Upper bound on microtasks a zone drains in one turn before it gives up
/// and signals quiescence anyway.
pub const MAX_MICROTASKS_PER_TURN: usize = 10_000;
