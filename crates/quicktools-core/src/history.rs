//! # History Module
//!
//! A bounded, newest-first list of results kept for the current session.
//!
//! ```text
//! push(r6) on a full history (capacity 5)
//!
//!   before: [r5, r4, r3, r2, r1]
//!   after:  [r6, r5, r4, r3, r2]   r1 is evicted and returned
//! ```
//!
//! Every tool with a history (base converter, rounding, calculator) uses
//! this type so the cap is enforced in exactly one place.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_HISTORY_LIMIT;

/// Newest-first history capped at `capacity` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedHistory<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> BoundedHistory<T> {
    /// Creates an empty history. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BoundedHistory {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Records an entry at the front, returning the evicted oldest entry
    /// when the history was already full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Snapshot of the entries, newest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        BoundedHistory::new(DEFAULT_HISTORY_LIMIT)
    }
}
