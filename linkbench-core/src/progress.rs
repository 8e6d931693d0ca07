//! Progress Reporting Contract
//!
//! The sweep driver emits `(units, stage label)` events through this trait
//! and knows nothing about rendering. The terminal implementation lives in
//! the CLI crate; `CountingSink` gives tests an exact unit count to check
//! against the estimator.
//!
//! Implementations must tolerate concurrent `increment` calls: the convert
//! phase fans out across a thread pool and each completed conversion
//! reports one unit from its worker thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Consumer of sweep progress events.
pub trait ProgressSink: Sync {
    /// Begin a sweep expected to consume `total_units` units.
    fn start(&self, total_units: u64);

    /// Advance by `delta` units within the named stage.
    fn increment(&self, delta: u64, stage: &str);

    /// Move to an absolute unit position within the named stage.
    fn update(&self, position: u64, stage: &str);

    /// The sweep is complete (or aborted); release any display resources.
    fn stop(&self);
}

/// Discards all progress events. Used when verbose logging replaces the bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn start(&self, _total_units: u64) {}
    fn increment(&self, _delta: u64, _stage: &str) {}
    fn update(&self, _position: u64, _stage: &str) {}
    fn stop(&self) {}
}

/// Records the announced total and the high-water unit position.
///
/// `increment` adds; `update` is monotonic (a stale absolute position never
/// moves the counter backwards). With disjoint per-phase unit segments the
/// final position equals the sum of all emitted units.
#[derive(Debug, Default)]
pub struct CountingSink {
    total: AtomicU64,
    position: AtomicU64,
}

impl CountingSink {
    /// A sink with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// The total passed to the most recent `start` call.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// The current unit position.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CountingSink {
    fn start(&self, total_units: u64) {
        self.total.store(total_units, Ordering::SeqCst);
        self.position.store(0, Ordering::SeqCst);
    }

    fn increment(&self, delta: u64, _stage: &str) {
        self.position.fetch_add(delta, Ordering::SeqCst);
    }

    fn update(&self, position: u64, _stage: &str) {
        self.position.fetch_max(position, Ordering::SeqCst);
    }

    fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_sink_tracks_increments() {
        let sink = CountingSink::new();
        sink.start(10);
        sink.increment(1, "convert");
        sink.increment(2, "convert");
        assert_eq!(sink.position(), 3);
        assert_eq!(sink.total(), 10);
    }

    #[test]
    fn counting_sink_update_is_monotonic() {
        let sink = CountingSink::new();
        sink.start(10);
        sink.update(4, "generate");
        sink.update(2, "generate");
        assert_eq!(sink.position(), 4);
        sink.update(7, "ld");
        assert_eq!(sink.position(), 7);
    }

    #[test]
    fn start_resets_position() {
        let sink = CountingSink::new();
        sink.start(5);
        sink.increment(5, "x");
        sink.start(8);
        assert_eq!(sink.position(), 0);
        assert_eq!(sink.total(), 8);
    }

    #[test]
    fn concurrent_increments_are_exact() {
        use std::thread;

        let sink = CountingSink::new();
        sink.start(64);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..8 {
                        sink.increment(1, "convert");
                    }
                });
            }
        });
        assert_eq!(sink.position(), 64);
    }
}
