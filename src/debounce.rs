//! Trailing-edge debouncing driven by an injectable clock
//!
//! No timers or threads: callers schedule keys and periodically ask which
//! deadlines have passed. Rescheduling a key pushes its deadline out, so
//! only the last call inside a window fires.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Pending deadlines keyed by `K`
#[derive(Debug)]
pub struct Debouncer<K> {
    window: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadlines: HashMap::new(),
        }
    }

    /// (Re)start the window for `key` at `now`
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.window);
    }

    /// Drop a pending call; returns whether one was pending
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest deadline first
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (key.clone(), *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        for (key, _) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }

    /// Remove and return every pending key regardless of deadline
    pub fn take_all(&mut self) -> Vec<K> {
        let mut all: Vec<(K, Instant)> = self.deadlines.drain().collect();
        all.sort_by_key(|(_, deadline)| *deadline);
        all.into_iter().map(|(key, _)| key).collect()
    }
}
