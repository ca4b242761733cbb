//! Cooperative step scheduler
//!
//! Routines do not block. Each one is flattened into steps stamped with the
//! scheduler time at which they run; `advance` moves the clock and `pop_due`
//! hands back whatever is ready. Steps due at the same instant run in the
//! order they were scheduled.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct Entry<T> {
    at: f32,
    item: T,
}

#[derive(Debug, Clone)]
pub struct Timeline<T> {
    entries: VecDeque<Entry<T>>,
    now: f32,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            now: 0.0,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `item` after `delay` seconds. Negative delays run on the next pop.
    pub fn schedule(&mut self, delay: f32, item: T) -> f32 {
        let at = self.now + delay.max(0.0);
        self.schedule_at(at, item);
        at
    }

    /// Run `item` at absolute scheduler time `at`
    pub fn schedule_at(&mut self, at: f32, item: T) {
        // Insert after every entry due at or before `at` (FIFO among equals)
        let index = self.entries.partition_point(|e| e.at <= at);
        self.entries.insert(index, Entry { at, item });
    }

    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.now += dt;
        }
    }

    /// Next step whose time has come
    pub fn pop_due(&mut self) -> Option<T> {
        if self.entries.front()?.at <= self.now {
            self.entries.pop_front().map(|e| e.item)
        } else {
            None
        }
    }

    /// Drop every pending step. The clock keeps running.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
