//! Dedup service
//!
//! Remembers which images have already been accepted by the sink so a
//! re-announced detection is not delivered twice.

use std::collections::HashSet;

/// Service trait for tracking delivered images
///
/// Only the poller mutates the tracker, and only after the sink has
/// confirmed a delivery.
pub trait DedupTracker: Send {
    /// Returns `true` if `image_name` was already delivered
    fn seen(&self, image_name: &str) -> bool;

    /// Records a confirmed delivery of `image_name`
    fn mark_sent(&mut self, image_name: &str);

    /// Number of distinct images delivered
    fn sent_count(&self) -> usize;
}

/// In-memory implementation of DedupTracker
///
/// Grows for the lifetime of the process with no eviction. A restart clears
/// it, so images still reported by the source after a restart are sent again.
#[derive(Debug, Default)]
pub struct InMemoryDedupTracker {
    sent: HashSet<String>,
}

impl InMemoryDedupTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupTracker for InMemoryDedupTracker {
    fn seen(&self, image_name: &str) -> bool {
        self.sent.contains(image_name)
    }

    fn mark_sent(&mut self, image_name: &str) {
        self.sent.insert(image_name.to_string());
    }

    fn sent_count(&self) -> usize {
        self.sent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_then_seen() {
        let mut tracker = InMemoryDedupTracker::new();
        assert!(!tracker.seen("a.jpg"));

        tracker.mark_sent("a.jpg");
        assert!(tracker.seen("a.jpg"));
        assert!(!tracker.seen("b.jpg"));
        assert_eq!(tracker.sent_count(), 1);

        tracker.mark_sent("a.jpg");
        assert_eq!(tracker.sent_count(), 1);
    }
}
