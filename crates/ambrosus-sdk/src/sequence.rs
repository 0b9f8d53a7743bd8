use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

/// Bounded per-session counter numbering the assets created in a session.
///
/// Values run `1, 2, ..., bound - 1, 0, 1, ...`: the counter wraps instead of
/// overflowing. Safe to share between threads.
#[derive(Debug)]
pub struct SequenceCounter {
    current: AtomicU32,
    bound: NonZeroU32,
}

impl SequenceCounter {
    /// Counter whose first [`SequenceCounter::next`] returns 1 (or 0 when `bound` is 1).
    pub fn new(bound: NonZeroU32) -> Self {
        Self::starting_at(bound, 0)
    }

    /// Counter resuming after `current`.
    pub fn starting_at(bound: NonZeroU32, current: u32) -> Self {
        Self {
            current: AtomicU32::new(current % bound.get()),
            bound,
        }
    }

    /// Advances the counter and returns the new value.
    pub fn next(&self) -> u32 {
        let bound = self.bound.get();
        let previous = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some((n + 1) % bound))
            .unwrap_or_else(|n| n);
        (previous + 1) % bound
    }

    /// Last value handed out.
    pub fn current(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }

    /// Modulus of the counter.
    pub fn bound(&self) -> u32 {
        self.bound.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn bound(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn counts_from_one_and_wraps_to_zero() {
        let counter = SequenceCounter::new(bound(3));
        let values: Vec<u32> = (0..7).map(|_| counter.next()).collect();
        assert_eq!(values, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn bound_plus_one_calls_wrap_at_default_bound() {
        let counter = SequenceCounter::starting_at(bound(1_000_000), 999_998);
        assert_eq!(counter.next(), 999_999);
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn concurrent_callers_get_distinct_values() {
        let counter = Arc::new(SequenceCounter::new(bound(1_000_000)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..250).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(counter.current(), 1000);
    }
}
