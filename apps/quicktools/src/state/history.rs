//! # History State
//!
//! Session history for the base converter and the rounding calculator.
//!
//! ## Thread Safety
//! Wrapped in `Arc<Mutex<T>>` because requests run as concurrent tasks and
//! every successful conversion writes to the history.

use std::sync::{Arc, Mutex, PoisonError};

use quicktools_core::{BoundedHistory, ConversionRecord, RoundingRecord};

/// Newest-first history of one tool's results.
#[derive(Debug)]
pub struct HistoryState<T> {
    history: Arc<Mutex<BoundedHistory<T>>>,
}

/// Base converter history.
pub type BaseState = HistoryState<ConversionRecord>;

/// Rounding calculator history.
pub type RoundingState = HistoryState<RoundingRecord>;

impl<T: Clone> HistoryState<T> {
    pub fn new(limit: usize) -> Self {
        HistoryState {
            history: Arc::new(Mutex::new(BoundedHistory::new(limit))),
        }
    }

    /// Records a result at the front.
    pub fn record(&self, entry: T) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.push(entry);
    }

    /// Entries, newest first.
    pub fn snapshot(&self) -> Vec<T> {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.to_vec()
    }
}

impl<T> Clone for HistoryState<T> {
    fn clone(&self) -> Self {
        HistoryState {
            history: Arc::clone(&self.history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_newest_first_within_limit() {
        let state = HistoryState::new(2);
        state.record(1);
        state.record(2);
        state.record(3);
        assert_eq!(state.snapshot(), vec![3, 2]);
    }

    #[test]
    fn test_clones_share_history() {
        let state = HistoryState::new(5);
        state.clone().record("a");
        assert_eq!(state.snapshot(), vec!["a"]);
    }
}
