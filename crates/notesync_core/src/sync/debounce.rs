//! Per-key debounce timer table.
//!
//! # Responsibility
//! - Coalesce repeated work for one key into a single execution.
//! - Keep armed timers inspectable so callers can cancel, move or drain them.
//!
//! # Invariants
//! - At most one armed entry exists per key.
//! - Re-scheduling a key replaces its action and restarts its quiet window.
//! - Nothing runs on its own; callers collect due actions with `take_due`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Armed<A> {
    deadline: Instant,
    action: A,
}

/// Debounce scheduler keyed by `K`, holding the latest action `A` per key.
#[derive(Debug, Clone)]
pub struct DebounceScheduler<K, A> {
    window: Duration,
    armed: BTreeMap<K, Armed<A>>,
}

impl<K: Ord + Clone, A> DebounceScheduler<K, A> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arms or re-arms `key`.
    ///
    /// Returns the superseded action when the key was already armed.
    pub fn schedule(&mut self, key: K, action: A, now: Instant) -> Option<A> {
        let deadline = now + self.window;
        self.armed
            .insert(key, Armed { deadline, action })
            .map(|previous| previous.action)
    }

    /// Disarms `key` without running it.
    pub fn cancel(&mut self, key: &K) -> Option<A> {
        self.armed.remove(key).map(|armed| armed.action)
    }

    /// Moves an armed entry to a new key, keeping its deadline.
    ///
    /// Returns `false` when `old` was not armed. An entry already armed under
    /// `new` is replaced.
    pub fn rekey(&mut self, old: &K, new: K) -> bool {
        match self.armed.remove(old) {
            Some(armed) => {
                self.armed.insert(new, armed);
                true
            }
            None => false,
        }
    }

    /// Removes and returns every entry whose deadline has passed.
    ///
    /// Results are ordered by deadline, then key.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, A)> {
        let due_keys: Vec<K> = self
            .armed
            .iter()
            .filter(|(_, armed)| armed.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        let mut due: Vec<(Instant, K, A)> = due_keys
            .into_iter()
            .filter_map(|key| {
                self.armed
                    .remove(&key)
                    .map(|armed| (armed.deadline, key, armed.action))
            })
            .collect();
        due.sort_by(|left, right| left.0.cmp(&right.0).then_with(|| left.1.cmp(&right.1)));
        due.into_iter().map(|(_, key, action)| (key, action)).collect()
    }

    /// Removes every armed entry regardless of deadline, in deadline order.
    pub fn drain(&mut self) -> Vec<(K, A)> {
        let mut all: Vec<(Instant, K, A)> = std::mem::take(&mut self.armed)
            .into_iter()
            .map(|(key, armed)| (armed.deadline, key, armed.action))
            .collect();
        all.sort_by(|left, right| left.0.cmp(&right.0).then_with(|| left.1.cmp(&right.1)));
        all.into_iter().map(|(_, key, action)| (key, action)).collect()
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.armed.contains_key(key)
    }

    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.armed.get(key).map(|armed| armed.deadline)
    }

    /// Earliest armed deadline, for hosts that sleep until the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.values().map(|armed| armed.deadline).min()
    }

    pub fn pending(&self, key: &K) -> Option<&A> {
        self.armed.get(key).map(|armed| &armed.action)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::DebounceScheduler;
    use std::time::{Duration, Instant};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn reschedule_restarts_window_and_keeps_latest_action() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(1_000));
        assert!(scheduler.schedule("k", "a", t0).is_none());
        assert_eq!(scheduler.schedule("k", "ab", t0 + ms(600)), Some("a"));

        assert!(scheduler.take_due(t0 + ms(1_000)).is_empty());
        assert_eq!(scheduler.take_due(t0 + ms(1_600)), vec![("k", "ab")]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_removes_without_returning_as_due() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(10));
        scheduler.schedule(1, "x", t0);
        assert_eq!(scheduler.cancel(&1), Some("x"));
        assert_eq!(scheduler.cancel(&1), None);
        assert!(scheduler.take_due(t0 + ms(100)).is_empty());
    }

    #[test]
    fn take_due_orders_by_deadline() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(10));
        scheduler.schedule("late", 2, t0 + ms(5));
        scheduler.schedule("early", 1, t0);
        scheduler.schedule("not-yet", 3, t0 + ms(50));

        let due = scheduler.take_due(t0 + ms(20));
        assert_eq!(due, vec![("early", 1), ("late", 2)]);
        assert!(scheduler.is_armed(&"not-yet"));
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(60)));
    }

    #[test]
    fn rekey_keeps_deadline() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(10));
        scheduler.schedule("tmp", "text", t0);
        assert!(scheduler.rekey(&"tmp", "stable"));
        assert!(!scheduler.is_armed(&"tmp"));
        assert_eq!(scheduler.deadline(&"stable"), Some(t0 + ms(10)));
        assert!(!scheduler.rekey(&"missing", "other"));
    }

    #[test]
    fn drain_empties_table() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(10));
        scheduler.schedule("a", 1, t0);
        scheduler.schedule("b", 2, t0);
        assert_eq!(scheduler.drain(), vec![("a", 1), ("b", 2)]);
        assert_eq!(scheduler.len(), 0);
    }
}
