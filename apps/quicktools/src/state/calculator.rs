//! # Calculator State
//!
//! Holds the calculator between key presses.
//!
//! ## Key Press Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Calculator State Operations                          │
//! │                                                                         │
//! │  Front end Action         Command                 State Change          │
//! │  ────────────────         ───────                 ────────────          │
//! │                                                                         │
//! │  Press 7 ────────────────► calculator(digit 7) ──► display "7"          │
//! │                                                                         │
//! │  Press + ────────────────► calculator(add) ──────► previous = 7         │
//! │                                                                         │
//! │  Press = ────────────────► calculator(equals) ───► history.push(..)     │
//! │                                                                         │
//! │  Page load ──────────────► calculator_state() ───► (read only)          │
//! │                                                                         │
//! │  NOTE: The IPC reader runs calculator commands itself, one line at a    │
//! │        time, so key presses apply in arrival order.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use quicktools_core::calculator::{CalculatorAction, CalculatorState, CalculatorView, Notice};

/// Thread-safe wrapper around the calculator reducer state.
#[derive(Debug, Clone)]
pub struct CalcState {
    calculator: Arc<Mutex<CalculatorState>>,
}

impl CalcState {
    pub fn new(history_limit: usize) -> Self {
        CalcState {
            calculator: Arc::new(Mutex::new(CalculatorState::with_history_limit(history_limit))),
        }
    }

    /// Applies one action and returns the resulting view.
    pub fn dispatch(&self, action: CalculatorAction) -> (CalculatorView, Option<Notice>) {
        let mut calculator = self.calculator.lock().unwrap_or_else(PoisonError::into_inner);
        let notice = calculator.dispatch(action);
        (calculator.view(), notice)
    }

    pub fn view(&self) -> CalculatorView {
        let calculator = self.calculator.lock().unwrap_or_else(PoisonError::into_inner);
        calculator.view()
    }
}
