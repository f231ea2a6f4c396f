use super::context::ExecutionContext;
use crate::graph::Node;
use crate::trace::{StepAction, StepBuilder, StepEvent, StepRecorder};
use crate::value::format_number;

/// Decides where control goes when an execution path dead-ends.
///
/// Inside a loop a dead end means "end of this iteration": control returns to
/// the innermost loop node, which then advances its frame. Outside any loop
/// the run halts.
pub(crate) struct LoopController;

impl LoopController {
    /// Called when `node`'s `handle` output has no outgoing connection.
    /// Returns the id of the node to continue with, if any.
    pub(crate) fn on_dead_end<'c>(
        ctx: &'c ExecutionContext,
        recorder: &mut StepRecorder,
        node: &Node,
        handle: &str,
    ) -> Option<&'c str> {
        let Some(frame) = ctx.innermost_frame() else {
            tracing::warn!(node = %node.id, handle, "execution path ended outside any loop");
            recorder.record(
                &ctx.current_array,
                StepBuilder::new(
                    StepAction::Custom,
                    StepEvent::PathEnded,
                    format!(
                        "Execution path ended at {} ('{}') without reaching an end node",
                        node.node_type, node.id
                    ),
                )
                .meta("nodeId", node.id.clone())
                .meta("handle", handle),
            );
            return None;
        };

        tracing::debug!(loop_node = %frame.node_id, iteration = frame.iteration + 1, "loop body complete");
        recorder.record(
            &ctx.current_array,
            StepBuilder::new(
                StepAction::Custom,
                StepEvent::LoopBodyComplete,
                format!(
                    "Loop body complete for iteration {} ({} = {})",
                    frame.iteration + 1,
                    frame.variable,
                    format_number(frame.current)
                ),
            )
            .extend_meta(ctx.loop_context())
            .meta("loopNodeId", frame.node_id.clone()),
        );
        Some(frame.node_id.as_str())
    }
}
