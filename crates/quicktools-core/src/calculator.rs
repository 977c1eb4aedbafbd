//! # Calculator Module
//!
//! A basic four-function calculator expressed as a state struct and a
//! reducer. The front end sends [`CalculatorAction`]s; the state changes
//! in one place and the caller renders the new state.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   AwaitingFirstOperand ──digit──► AwaitingFirstOperand                  │
//! │          │                                                              │
//! │       operator                                                          │
//! │          ▼                                                              │
//! │   AwaitingSecondOperand ──digit──► AwaitingOperator                     │
//! │          ▲                               │                              │
//! │          │                    operator (evaluate now,                   │
//! │          └──────────────────── left to right, no precedence)            │
//! │                                          │                              │
//! │                                         "="                             │
//! │                                          ▼                              │
//! │                              result shown, nothing pending              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three states collapse into `previous_value`, `operation` and
//! `waiting_for_operand`; `operation` is `Some` only while a binary
//! operation is waiting for its second operand.
//!
//! ## Chained Evaluation
//! `5 + 3 × 2 =` gives `16`, not `11`: pressing `×` evaluates `5 + 3`
//! immediately and `× 2` then applies to `8`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::history::BoundedHistory;
use crate::DEFAULT_HISTORY_LIMIT;

/// Digits accepted in one operand before further digits are ignored.
pub const MAX_INPUT_DIGITS: usize = 16;

// =============================================================================
// Operations
// =============================================================================

/// Binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Key label, as printed in history expressions.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }
}

/// Something the user should be told about. Never an error: the reducer
/// always leaves the state consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// `x ÷ 0` was requested; the dividend was kept.
    DivisionByZero { dividend: f64 },
    /// A digit outside `0..=9` was sent.
    IgnoredDigit { digit: u8 },
}

/// Result of one binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub notice: Option<Notice>,
}

/// Applies `op` to the operands.
///
/// Division by zero does not fail: it returns the dividend unchanged and
/// reports [`Notice::DivisionByZero`].
///
/// ## Example
/// ```rust
/// use quicktools_core::calculator::{perform_calculation, Notice, Operation};
///
/// let eval = perform_calculation(5.0, 0.0, Operation::Divide);
/// assert_eq!(eval.value, 5.0);
/// assert_eq!(eval.notice, Some(Notice::DivisionByZero { dividend: 5.0 }));
/// ```
pub fn perform_calculation(lhs: f64, rhs: f64, op: Operation) -> Evaluation {
    let value = match op {
        Operation::Add => lhs + rhs,
        Operation::Subtract => lhs - rhs,
        Operation::Multiply => lhs * rhs,
        Operation::Divide if rhs == 0.0 => {
            return Evaluation {
                value: lhs,
                notice: Some(Notice::DivisionByZero { dividend: lhs }),
            };
        }
        Operation::Divide => lhs / rhs,
    };
    Evaluation {
        value,
        notice: None,
    }
}

/// Formats a value for the display.
///
/// ## Example
/// ```rust
/// use quicktools_core::calculator::format_number;
///
/// assert_eq!(format_number(42.0), "42");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(0.5), "0.5");
/// assert_eq!(format_number(f64::INFINITY), "Error");
/// ```
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "Error".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

// =============================================================================
// Actions
// =============================================================================

/// Everything a key press can ask of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CalculatorAction {
    Digit(u8),
    Decimal,
    Operator(Operation),
    Equals,
    /// AC: everything except memory and history.
    Clear,
    /// CE: current entry only.
    ClearEntry,
    Backspace,
    ToggleSign,
    Percent,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
    MemoryClear,
}

/// One completed binary operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationEntry {
    pub expression: String,
    pub result: String,
}

// =============================================================================
// State
// =============================================================================

/// Calculator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorState {
    pub display: String,
    pub previous_value: Option<f64>,
    pub operation: Option<Operation>,
    pub waiting_for_operand: bool,
    pub memory: f64,
    pub history: BoundedHistory<CalculationEntry>,
}

/// Serializable snapshot for the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorView {
    pub display: String,
    pub previous_value: Option<f64>,
    pub operation: Option<Operation>,
    pub waiting_for_operand: bool,
    pub memory: f64,
    pub history: Vec<CalculationEntry>,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl CalculatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(limit: usize) -> Self {
        CalculatorState {
            display: "0".to_string(),
            previous_value: None,
            operation: None,
            waiting_for_operand: false,
            memory: 0.0,
            history: BoundedHistory::new(limit),
        }
    }

    /// Current display parsed as a number (`0` when unparsable).
    pub fn display_value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    pub fn view(&self) -> CalculatorView {
        CalculatorView {
            display: self.display.clone(),
            previous_value: self.previous_value,
            operation: self.operation,
            waiting_for_operand: self.waiting_for_operand,
            memory: self.memory,
            history: self.history.to_vec(),
        }
    }

    /// The reducer: applies one action and returns a notice for the user,
    /// if any.
    pub fn dispatch(&mut self, action: CalculatorAction) -> Option<Notice> {
        match action {
            CalculatorAction::Digit(d) => return self.input_digit(d),
            CalculatorAction::Decimal => self.input_decimal(),
            CalculatorAction::Operator(op) => return self.input_operation(op),
            CalculatorAction::Equals => return self.calculate(),
            CalculatorAction::Clear => {
                self.display = "0".to_string();
                self.previous_value = None;
                self.operation = None;
                self.waiting_for_operand = false;
            }
            CalculatorAction::ClearEntry => {
                self.display = "0".to_string();
                self.waiting_for_operand = false;
            }
            CalculatorAction::Backspace => self.backspace(),
            CalculatorAction::ToggleSign => self.toggle_sign(),
            CalculatorAction::Percent => {
                self.display = format_number(self.display_value() / 100.0);
            }
            CalculatorAction::MemoryAdd => {
                self.memory += self.display_value();
                self.waiting_for_operand = true;
            }
            CalculatorAction::MemorySubtract => {
                self.memory -= self.display_value();
                self.waiting_for_operand = true;
            }
            CalculatorAction::MemoryRecall => {
                self.display = format_number(self.memory);
                self.waiting_for_operand = true;
            }
            CalculatorAction::MemoryClear => self.memory = 0.0,
        }
        None
    }

    fn input_digit(&mut self, digit: u8) -> Option<Notice> {
        if digit > 9 {
            return Some(Notice::IgnoredDigit { digit });
        }
        let d = char::from(b'0' + digit);

        if self.waiting_for_operand {
            self.display = d.to_string();
            self.waiting_for_operand = false;
        } else if self.display == "0" {
            self.display = d.to_string();
        } else if self.display.chars().filter(char::is_ascii_digit).count() < MAX_INPUT_DIGITS {
            self.display.push(d);
        }
        None
    }

    fn input_decimal(&mut self) {
        if self.waiting_for_operand {
            self.display = "0.".to_string();
            self.waiting_for_operand = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    fn input_operation(&mut self, next: Operation) -> Option<Notice> {
        // Operator pressed twice in a row: the second one replaces the first.
        if self.waiting_for_operand && self.operation.is_some() {
            self.operation = Some(next);
            return None;
        }

        let input = self.display_value();
        let mut notice = None;

        match (self.previous_value, self.operation) {
            (Some(previous), Some(pending)) => {
                let eval = self.evaluate(previous, input, pending);
                self.display = format_number(eval.value);
                self.previous_value = Some(eval.value);
                notice = eval.notice;
            }
            _ => self.previous_value = Some(input),
        }

        self.waiting_for_operand = true;
        self.operation = Some(next);
        notice
    }

    fn calculate(&mut self) -> Option<Notice> {
        let (Some(previous), Some(pending)) = (self.previous_value, self.operation) else {
            return None;
        };

        let eval = self.evaluate(previous, self.display_value(), pending);
        self.display = format_number(eval.value);
        self.previous_value = None;
        self.operation = None;
        self.waiting_for_operand = true;
        eval.notice
    }

    /// Evaluates and records the operation in history. A division by zero
    /// is not recorded.
    fn evaluate(&mut self, lhs: f64, rhs: f64, op: Operation) -> Evaluation {
        let eval = perform_calculation(lhs, rhs, op);
        if eval.notice.is_none() {
            self.history.push(CalculationEntry {
                expression: format!(
                    "{} {} {}",
                    format_number(lhs),
                    op.symbol(),
                    format_number(rhs)
                ),
                result: format_number(eval.value),
            });
        }
        eval
    }

    fn backspace(&mut self) {
        if self.waiting_for_operand {
            return;
        }
        self.display.pop();
        if self.display.is_empty() || self.display == "-" {
            self.display = "0".to_string();
        }
    }

    fn toggle_sign(&mut self) {
        if let Some(rest) = self.display.strip_prefix('-') {
            self.display = rest.to_string();
        } else if self.display_value() != 0.0 || self.display.contains('.') {
            self.display.insert(0, '-');
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
