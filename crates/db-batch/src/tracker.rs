use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

/// Counts the writers a store has handed out and not yet seen closed.
///
/// Clones share the same counter, so a store and every batch it creates observe one value from
/// any thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriterTracker {
    open: Arc<AtomicI64>,
}

impl WriterTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a newly opened writer and returns the new count.
    pub(crate) fn increment(&self) -> i64 {
        self.open.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records a closed writer and returns the new count.
    pub(crate) fn decrement(&self) -> i64 {
        self.open.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Current number of open writers.
    pub(crate) fn count(&self) -> i64 {
        self.open.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_clones_share_counter() {
        let tracker = WriterTracker::new();
        let other = tracker.clone();

        assert_eq!(tracker.increment(), 1);
        assert_eq!(other.increment(), 2);
        assert_eq!(tracker.decrement(), 1);
        assert_eq!(other.count(), 1);
    }

    #[test]
    fn test_concurrent_updates() {
        let tracker = WriterTracker::new();

        thread::scope(|s| {
            for _ in 0..8 {
                let tracker = tracker.clone();
                s.spawn(move || {
                    for _ in 0..1000 {
                        tracker.increment();
                        tracker.decrement();
                    }
                });
            }
        });

        assert_eq!(tracker.count(), 0);
    }
}
