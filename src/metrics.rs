//! Process-local counters surfaced on the admin pages.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts page loads of the static app. Plain counter, no ordering
/// requirements beyond atomicity.
#[derive(Debug, Default)]
pub struct HitCounter(AtomicU64);

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_counts_and_resets() {
        let hits = HitCounter::new();
        assert_eq!(hits.load(), 0);

        hits.increment();
        hits.increment();
        assert_eq!(hits.load(), 2);

        hits.reset();
        assert_eq!(hits.load(), 0);
    }
}
