//! Keyed debounce timers.
//!
//! A [`Scheduler`] holds at most one pending deadline per key. Scheduling a key
//! that is already pending replaces its deadline, so a burst of triggers
//! collapses into a single firing after the last one. The key itself names
//! the action: the owner decides what to do when [`Scheduler::drain_due`]
//! hands it back, and reads whatever state is current at that moment.
//!
//! Nothing here sleeps or spawns. Time is passed in, which keeps the owner
//! single-threaded and lets tests drive timers with a manual clock.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

pub struct Scheduler<K> {
    pending: HashMap<K, DateTime<Utc>>,
    heap: BinaryHeap<Reverse<(DateTime<Utc>, K)>>,
}

impl<K: Clone + Eq + Hash + Ord> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash + Ord> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            heap: BinaryHeap::new(),
        }
    }

    /// Arms `key` to fire `delay` after `now`, cancelling any earlier arming.
    pub fn schedule_after(&mut self, key: K, delay: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = now + delay;
        self.pending.insert(key.clone(), deadline);
        self.heap.push(Reverse((deadline, key)));
        deadline
    }

    /// Returns true if something was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn deadline(&self, key: &K) -> Option<DateTime<Utc>> {
        self.pending.get(key).copied()
    }

    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        self.pop_stale();
        self.heap.peek().map(|Reverse((t, _))| *t)
    }

    /// Removes and returns every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn drain_due(&mut self, now: DateTime<Utc>) -> Vec<K> {
        let mut due = Vec::new();
        loop {
            self.pop_stale();
            let Some(Reverse((fire_at, key))) = self.heap.peek().cloned() else {
                break;
            };
            if fire_at > now {
                break;
            }
            let _ = self.heap.pop();
            if self.pending.get(&key).copied() == Some(fire_at) {
                self.pending.remove(&key);
                due.push(key);
            }
        }
        due
    }

    fn pop_stale(&mut self) {
        while let Some(Reverse((fire_at, key))) = self.heap.peek() {
            match self.pending.get(key).copied() {
                Some(current) if current == *fire_at => break,
                _ => {
                    let _ = self.heap.pop();
                }
            }
        }
    }
}
