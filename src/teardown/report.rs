//! Outcome of a single queue flush

use fxhash::FxHashMap;

use super::kind::RemovalKind;

/// A removal the engine rejected during a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    pub kind: RemovalKind,
    pub id: String,
    pub error: String,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    /// Teardown attempts per kind, successful or not
    pub attempted: FxHashMap<RemovalKind, usize>,
    /// Attempts the engine rejected, in the order they were made
    pub failures: Vec<RemovalFailure>,
    /// Entries dropped without an attempt because the engine was gone
    pub discarded: usize,
    /// Whether the flush bailed out on a destroyed engine
    pub skipped: bool,
    /// Whether the engine was borrowed elsewhere and the batch was left
    /// pending for the next trigger
    pub deferred: bool,
    /// Listener unbinds that failed before a layer was removed. The layer
    /// removal itself was still attempted.
    pub unbind_failures: Vec<RemovalFailure>,
}

impl FlushReport {
    pub(crate) fn skipped(discarded: usize) -> Self {
        Self {
            discarded,
            skipped: true,
            ..Default::default()
        }
    }

    pub(crate) fn deferred() -> Self {
        Self {
            deferred: true,
            ..Default::default()
        }
    }

    pub(crate) fn record_attempt(&mut self, kind: RemovalKind) {
        *self.attempted.entry(kind).or_insert(0) += 1;
    }

    pub(crate) fn record_failure(&mut self, kind: RemovalKind, id: &str, error: String) {
        self.failures.push(RemovalFailure {
            kind,
            id: id.to_string(),
            error,
        });
    }

    pub(crate) fn record_unbind_failure(&mut self, layer_id: &str, error: String) {
        self.unbind_failures.push(RemovalFailure {
            kind: RemovalKind::Layer,
            id: layer_id.to_string(),
            error,
        });
    }

    pub fn attempted_for(&self, kind: RemovalKind) -> usize {
        self.attempted.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_attempted(&self) -> usize {
        self.attempted.values().sum()
    }

    pub fn succeeded(&self) -> usize {
        self.total_attempted() - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.discarded == 0
    }

    /// True when nothing was pending.
    pub fn is_empty(&self) -> bool {
        self.total_attempted() == 0 && self.discarded == 0 && !self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = FlushReport::default();
        assert!(report.is_empty());

        report.record_attempt(RemovalKind::Layer);
        report.record_attempt(RemovalKind::Layer);
        report.record_attempt(RemovalKind::Image);
        report.record_failure(RemovalKind::Image, "pin", "Unknown image: pin".to_string());

        assert_eq!(report.attempted_for(RemovalKind::Layer), 2);
        assert_eq!(report.attempted_for(RemovalKind::Source), 0);
        assert_eq!(report.total_attempted(), 3);
        assert_eq!(report.succeeded(), 2);
        assert!(!report.is_clean());
        assert!(!report.is_empty());
    }

    #[test]
    fn test_skipped() {
        let report = FlushReport::skipped(4);
        assert!(report.skipped);
        assert_eq!(report.discarded, 4);
        assert_eq!(report.total_attempted(), 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_deferred_is_not_empty() {
        let report = FlushReport::deferred();
        assert!(report.deferred);
        assert!(!report.is_empty());
        assert!(report.is_clean());
        assert_eq!(report.total_attempted(), 0);
    }
}
