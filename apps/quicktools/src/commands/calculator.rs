//! # Calculator Commands
//!
//! Every key press is one `calculator` command carrying a
//! [`CalculatorAction`]; the response is the full view to render.

use quicktools_core::calculator::{CalculatorAction, CalculatorView, Notice};
use serde::Serialize;
use tracing::{debug, warn};

use crate::state::CalcState;

/// View after an action, plus anything the user should be told.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResponse {
    #[serde(flatten)]
    pub view: CalculatorView,
    pub notice: Option<Notice>,
}

/// Applies one key press.
///
/// Division by zero is not an error: the dividend stays on the display
/// and the response carries a notice.
pub fn calculator(state: &CalcState, action: CalculatorAction) -> CalculatorResponse {
    debug!(?action, "calculator command");

    let (view, notice) = state.dispatch(action);
    match notice {
        Some(Notice::DivisionByZero { dividend }) => {
            warn!(dividend, "Division by zero, keeping the dividend");
        }
        Some(Notice::IgnoredDigit { digit }) => {
            debug!(digit, "Ignored out-of-range digit");
        }
        None => {}
    }

    CalculatorResponse { view, notice }
}

/// Current calculator view, for page load.
pub fn calculator_state(state: &CalcState) -> CalculatorView {
    debug!("calculator_state command");
    state.view()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktools_core::calculator::Operation;

    fn press(state: &CalcState, actions: &[CalculatorAction]) -> CalculatorResponse {
        let mut last = None;
        for action in actions {
            last = Some(calculator(state, *action));
        }
        last.unwrap()
    }

    #[test]
    fn test_chained_operations() {
        use CalculatorAction::*;
        let state = CalcState::new(10);
        let response = press(
            &state,
            &[Digit(2), Operator(Operation::Add), Digit(3), Operator(Operation::Multiply), Digit(4), Equals],
        );

        assert_eq!(response.view.display, "20");
        assert_eq!(response.view.history.len(), 2);
        assert_eq!(response.view.history[0].expression, "5 × 4");
    }

    #[test]
    fn test_division_by_zero_returns_notice() {
        use CalculatorAction::*;
        let state = CalcState::new(10);
        let response = press(&state, &[Digit(9), Operator(Operation::Divide), Digit(0), Equals]);

        assert_eq!(response.view.display, "9");
        assert_eq!(response.notice, Some(Notice::DivisionByZero { dividend: 9.0 }));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["notice"]["kind"], "division_by_zero");
        assert_eq!(json["display"], "9");
    }

    #[test]
    fn test_state_survives_between_commands() {
        let state = CalcState::new(10);
        calculator(&state, CalculatorAction::Digit(7));
        calculator(&state, CalculatorAction::MemoryAdd);
        assert_eq!(calculator_state(&state).memory, 7.0);
    }
}
