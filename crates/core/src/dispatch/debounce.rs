//! Counter-based debounce coalescing.
//!
//! Collapses a burst of triggers for one event class into a single execution
//! fired once the burst quiesces:
//!
//! 1. Every trigger atomically increments the class counter (initializing it
//!    to 1) and refreshes its expiry to `delay + safety_margin`.
//! 2. Every trigger also schedules one deferred decrement at `now + delay`.
//! 3. A deferred decrement that finds the key absent or expired does nothing.
//!    The decrement that reaches zero deletes the key and runs the work;
//!    any other decrement does nothing.
//!
//! The decrement belonging to the *last* trigger of a burst is the one that
//! reaches zero, so the work runs exactly once, `delay` after the burst's
//! last call. Every counter mutation goes through the map's entry API and is
//! a single atomic operation; lost updates would break the exactly-once
//! guarantee.
//!
//! The expiry is a safety net for lost decrements (a killed worker, a
//! dropped runtime). Deferred tasks normally fire well before it: the margin
//! is refreshed on every increment.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

struct CounterEntry {
    count: u32,
    expires_at: Instant,
}

/// Debounce coalescer over an in-process shared counter store.
#[derive(Clone)]
pub struct DebounceCoalescer {
    counters: Arc<DashMap<String, CounterEntry>>,
    delay: Duration,
    safety_margin: Duration,
}

impl DebounceCoalescer {
    pub fn new(delay: Duration, safety_margin: Duration) -> Self {
        DebounceCoalescer {
            counters: Arc::new(DashMap::new()),
            delay,
            safety_margin,
        }
    }

    /// Registers one trigger for `key` and schedules its deferred decrement.
    ///
    /// `work` runs only if this trigger's decrement is the one that empties
    /// the counter. Intermediate triggers are intentionally lossy; only the
    /// settled state matters to subscribers.
    pub fn trigger<F, Fut>(&self, key: &str, work: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let now = Instant::now();
        let expires_at = now + self.delay + self.safety_margin;

        match self.counters.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.expires_at <= now {
                    // Stale leftover from a lost burst; start over.
                    entry.count = 1;
                } else {
                    entry.count += 1;
                }
                entry.expires_at = expires_at;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CounterEntry {
                    count: 1,
                    expires_at,
                });
            }
        }

        let counters = Arc::clone(&self.counters);
        let delay = self.delay;
        let key = key.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let reached_zero = match counters.entry(key) {
                Entry::Occupied(mut occupied) => {
                    if occupied.get().expires_at <= Instant::now() {
                        // Expired key: treat as absent, benign.
                        occupied.remove();
                        false
                    } else {
                        let entry = occupied.get_mut();
                        entry.count -= 1;
                        if entry.count == 0 {
                            occupied.remove();
                            true
                        } else {
                            false
                        }
                    }
                }
                // Key already gone: an earlier decrement won, benign.
                Entry::Vacant(_) => false,
            };

            if reached_zero {
                work().await;
            }
        });
    }

    /// Current counter value for a key, if present. Diagnostics only.
    pub fn pending(&self, key: &str) -> Option<u32> {
        self.counters.get(key).map(|entry| entry.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_secs(10);
    const MARGIN: Duration = Duration::from_secs(60);

    fn counting_work(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> futures::future::Ready<()> {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_trigger_runs_once_after_delay() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs = Arc::new(AtomicUsize::new(0));

        debounce.trigger("key", counting_work(&runs));

        tokio::time::sleep(DELAY - Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0, "Must not fire before the delay");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(debounce.pending("key"), None, "Key is deleted after the run");
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_execution() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs = Arc::new(AtomicUsize::new(0));

        // 5 triggers, 1s apart, all within overlapping windows
        for _ in 0..5 {
            debounce.trigger("key", counting_work(&runs));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        assert_eq!(debounce.pending("key"), Some(5));

        // The 4 earlier decrements fire without executing
        tokio::time::sleep(DELAY - Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        // Only the last trigger's decrement reaches zero
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_is_timed_from_last_trigger() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs = Arc::new(AtomicUsize::new(0));

        debounce.trigger("key", counting_work(&runs));
        tokio::time::sleep(Duration::from_secs(8)).await;
        debounce.trigger("key", counting_work(&runs));

        // 10s after the FIRST trigger only its own decrement has fired
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        // 10s after the second trigger the work runs
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_execute() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs = Arc::new(AtomicUsize::new(0));

        debounce.trigger("key", counting_work(&runs));
        tokio::time::sleep(DELAY + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        debounce.trigger("key", counting_work(&runs));
        tokio::time::sleep(DELAY + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_interfere() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs_a = Arc::new(AtomicUsize::new(0));
        let runs_b = Arc::new(AtomicUsize::new(0));

        debounce.trigger("a", counting_work(&runs_a));
        debounce.trigger("b", counting_work(&runs_b));

        tokio::time::sleep(DELAY + Duration::from_secs(1)).await;
        assert_eq!(runs_a.load(Ordering::SeqCst), 1);
        assert_eq!(runs_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_triggers_execute_once() {
        let debounce = DebounceCoalescer::new(DELAY, MARGIN);
        let runs = Arc::new(AtomicUsize::new(0));

        // Same instant, no interleaved sleeps: all 20 share one window
        for _ in 0..20 {
            debounce.trigger("key", counting_work(&runs));
        }

        tokio::time::sleep(DELAY + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
