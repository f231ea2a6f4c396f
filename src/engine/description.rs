use super::context::ExecutionContext;
use crate::value::{Value, format_number};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

/// Expands `{name}` placeholders in a narration template.
///
/// Lookup order: `{value}` from the node's value input, then bound variables,
/// then the loop aliases `{i}`, `{index}` and `{iteration}`, which all read the
/// innermost loop's current value. Unknown placeholders are left as written.
pub(crate) fn render_template(template: &str, value: &Value, ctx: &ExecutionContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            if name == "value" {
                return value.to_string();
            }
            if let Some(bound) = ctx.variable(name) {
                return bound.to_string();
            }
            match (name, ctx.innermost_frame()) {
                ("i" | "index" | "iteration", Some(frame)) => format_number(frame.current),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::LoopFrame;

    fn context_in_loop(current: f64) -> ExecutionContext {
        let mut ctx = ExecutionContext::new(&[]);
        ctx.loop_stack.push(LoopFrame {
            node_id: "loop".to_string(),
            variable: "k".to_string(),
            current,
            end: 10.0,
            iteration: 3,
        });
        ctx
    }

    #[test]
    fn substitutes_value_variables_and_loop_aliases() {
        let mut ctx = context_in_loop(3.0);
        ctx.set_variable("maxValue", Value::Number(42.0));
        let rendered = render_template(
            "New maximum {maxValue} (read {value}) at {i}/{index}/{ iteration }",
            &Value::Number(7.5),
            &ctx,
        );
        assert_eq!(rendered, "New maximum 42 (read 7.5) at 3/3/3");
    }

    #[test]
    fn bound_variables_shadow_loop_aliases() {
        let mut ctx = context_in_loop(3.0);
        ctx.set_variable("i", Value::Number(9.0));
        assert_eq!(render_template("{i}", &Value::Number(0.0), &ctx), "9");
    }

    #[test]
    fn leaves_unknown_placeholders_untouched() {
        let ctx = ExecutionContext::new(&[]);
        assert_eq!(
            render_template("{missing} and {i}", &Value::Bool(true), &ctx),
            "{missing} and {i}"
        );
    }
}
