use super::step::{ElementState, Step, StepAction};
use crate::value::format_number;
use itertools::Itertools;

/// Formats step traces into human-readable text.
pub struct TraceFormatter;

impl TraceFormatter {
    /// Formats a whole trace, one numbered line per step.
    pub fn format_trace(steps: &[Step]) -> String {
        let width = steps.len().to_string().len();
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| format!("{:>width$}. {}", index + 1, Self::format_step(step)))
            .join("\n")
    }

    /// Formats a single step as `[action] description | array`.
    pub fn format_step(step: &Step) -> String {
        let mut line = format!("[{}] {}", Self::action_name(step.action), step.description);
        if !step.array_state.is_empty() {
            line.push_str("  | ");
            line.push_str(&Self::format_array(step));
        }
        if step.is_error() {
            line.push_str("  (!)");
        }
        line
    }

    /// Renders the snapshot, marking element states:
    /// `<n>` comparing, `{n}` swapping, `[n]` highlighted.
    fn format_array(step: &Step) -> String {
        step.array_state
            .iter()
            .map(|element| {
                let value = format_number(element.value);
                match element.state {
                    ElementState::Default => value,
                    ElementState::Comparing => format!("<{}>", value),
                    ElementState::Swapping => format!("{{{}}}", value),
                    ElementState::Highlighted => format!("[{}]", value),
                }
            })
            .join(" ")
    }

    fn action_name(action: StepAction) -> &'static str {
        match action {
            StepAction::Compare => "compare",
            StepAction::Swap => "swap",
            StepAction::Traverse => "traverse",
            StepAction::Highlight => "highlight",
            StepAction::Pause => "pause",
            StepAction::Custom => "custom",
        }
    }
}
