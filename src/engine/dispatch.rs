use super::context::{ExecutionContext, LoopFrame};
use super::description::render_template;
use super::index::GraphIndex;
use super::loops::LoopController;
use super::resolver::{DataResolver, operator};
use crate::catalog::{EXEC_OUT, NodeType};
use crate::error::ExecutionError;
use crate::graph::{Graph, Node};
use crate::trace::{ElementState, StepAction, StepBuilder, StepEvent, StepRecorder};
use crate::value::{Value, format_number};

/// State of one in-progress run.
pub(super) struct Run<'g> {
    index: &'g GraphIndex<'g>,
    resolver: DataResolver<'g>,
    ctx: ExecutionContext,
    recorder: StepRecorder,
    step_limit: Option<usize>,
}

impl<'g> Run<'g> {
    pub(super) fn new(
        index: &'g GraphIndex<'g>,
        ctx: ExecutionContext,
        step_limit: Option<usize>,
    ) -> Self {
        Self {
            index,
            resolver: DataResolver::new(index),
            ctx,
            recorder: StepRecorder::new(),
            step_limit,
        }
    }

    /// Walks the graph to completion or failure.
    pub(super) fn execute(mut self, graph: &'g Graph) -> (ExecutionContext, StepRecorder) {
        let Some(start) = graph.nodes_of_type(NodeType::Start).next() else {
            tracing::error!("no start node, nothing to run");
            self.ctx.error = Some(ExecutionError::MissingStart);
            return (self.ctx, self.recorder);
        };

        tracing::info!(
            start = %start.id,
            nodes = graph.nodes.len(),
            connections = graph.connections.len(),
            "starting run"
        );
        if let Err(error) = self.walk(start) {
            self.fail(error);
        }
        tracing::info!(
            steps = self.recorder.len(),
            completed = self.ctx.is_complete,
            "run finished"
        );
        (self.ctx, self.recorder)
    }

    /// The dispatch loop. Loop re-entry works by redirecting `current`, so
    /// this stays a flat loop however deep loops nest.
    fn walk(&mut self, start: &'g Node) -> Result<(), ExecutionError> {
        let mut previous: &'g str = start.id.as_str();
        let mut current: Option<&'g str> = Some(previous);

        while let Some(node_id) = current {
            if self.ctx.is_complete {
                break;
            }
            if let Some(limit) = self.step_limit {
                if self.recorder.len() >= limit {
                    return Err(ExecutionError::StepLimitExceeded { limit });
                }
            }
            let node = self
                .index
                .node(node_id)
                .ok_or_else(|| ExecutionError::NodeNotFound {
                    node_id: node_id.to_string(),
                    source_node_id: previous.to_string(),
                })?;

            tracing::debug!(node = %node.id, node_type = %node.node_type, "dispatch");
            current = self.dispatch(node);
            previous = node.id.as_str();
        }
        Ok(())
    }

    fn dispatch(&mut self, node: &'g Node) -> Option<&'g str> {
        match node.node_type {
            NodeType::Start => self.start(node),
            NodeType::End => self.end(node),
            NodeType::ForLoop => self.for_loop(node),
            NodeType::IfCondition => self.if_condition(node),
            NodeType::ArrayAccess => self.array_access(node),
            NodeType::ArrayCompare => self.array_compare(node),
            NodeType::ArraySwap => self.array_swap(node),
            NodeType::ArrayHighlight => self.array_highlight(node),
            NodeType::VariableSet => self.variable_set(node),
            NodeType::VariableGet => self.variable_get(node),
            NodeType::CounterIncrement => self.counter_increment(node),
            NodeType::UpdateDescription => self.update_description(node),
            NodeType::PauseExecution => self.pause(node),
        }
    }

    /// Moves along `handle`, handing dead ends to the loop controller.
    fn advance(&mut self, node: &'g Node, handle: &str) -> Option<&'g str> {
        if let Some(next) = self.index.next(&node.id, handle) {
            return Some(next);
        }
        let index = self.index;
        LoopController::on_dead_end(&self.ctx, &mut self.recorder, node, handle)
            .and_then(|loop_id| index.node(loop_id))
            .map(|loop_node| loop_node.id.as_str())
    }

    fn record(&mut self, builder: StepBuilder) {
        self.recorder.record(&self.ctx.current_array, builder);
    }

    /// Records a step tagged with the innermost loop's context.
    fn record_in_loop(&mut self, builder: StepBuilder) {
        let builder = builder.extend_meta(self.ctx.loop_context());
        self.record(builder);
    }

    fn fail(&mut self, error: ExecutionError) {
        tracing::error!(%error, "run aborted");
        let builder = StepBuilder::new(StepAction::Custom, StepEvent::Error, format!("Error: {}", error))
            .error(error.to_string());
        self.record_in_loop(builder);
        self.ctx.error = Some(error);
    }

    fn resolve(&self, node: &'g Node, handle: &str) -> Value {
        self.resolver.resolve(node, handle, &self.ctx)
    }

    /// Resolves an index input against the working array.
    fn resolve_index(&self, node: &'g Node, handle: &str) -> (Value, Option<usize>) {
        let raw = self.resolve(node, handle);
        let index = raw
            .as_index()
            .filter(|i| *i < self.ctx.current_array.len());
        (raw, index)
    }

    fn out_of_bounds(&mut self, node: &Node, event: StepEvent, action: StepAction, raw: &[Value]) {
        let shown = raw.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
        let message = format!(
            "Index {} is out of bounds for an array of length {}",
            shown,
            self.ctx.current_array.len()
        );
        tracing::warn!(node = %node.id, indices = %shown, "out-of-bounds array access");
        let builder = StepBuilder::new(action, event, message.clone())
            .error(message)
            .meta("outOfBounds", true)
            .meta("nodeId", node.id.clone());
        self.record_in_loop(builder);
    }

    fn start(&mut self, node: &'g Node) -> Option<&'g str> {
        let builder = StepBuilder::new(StepAction::Custom, StepEvent::Started, "Algorithm started")
            .meta("arrayLength", self.ctx.current_array.len());
        self.record(builder);
        self.advance(node, EXEC_OUT)
    }

    fn end(&mut self, _node: &'g Node) -> Option<&'g str> {
        self.ctx.is_complete = true;
        let builder =
            StepBuilder::new(StepAction::Custom, StepEvent::Completed, "Algorithm complete")
                .meta("complete", true)
                .meta("variables", self.ctx.variables_json());
        self.record(builder);
        None
    }

    fn for_loop(&mut self, node: &'g Node) -> Option<&'g str> {
        match self.ctx.loop_stack.iter().rposition(|f| f.node_id == node.id) {
            Some(position) => self.reenter_loop(node, position),
            None => self.enter_loop(node),
        }
    }

    fn enter_loop(&mut self, node: &'g Node) -> Option<&'g str> {
        let variable = node.data_str("variable").unwrap_or("i").to_string();
        let start = self.resolve(node, "start").as_number();
        let end = self.resolve(node, "end").as_number();

        self.ctx.set_variable(variable.clone(), Value::Number(start));
        self.ctx.loop_stack.push(LoopFrame {
            node_id: node.id.clone(),
            variable: variable.clone(),
            current: start,
            end,
            iteration: 0,
        });

        if start < end {
            self.record_iteration(node);
            return self.advance(node, "body");
        }

        self.ctx.loop_stack.pop();
        let builder = StepBuilder::new(
            StepAction::Custom,
            StepEvent::LoopSkipped,
            format!(
                "Loop skipped: {} = {} is not below {}",
                variable,
                format_number(start),
                format_number(end)
            ),
        )
        .meta("loopVariable", variable)
        .meta("iterations", 0)
        .meta("start", start)
        .meta("end", end);
        self.record_in_loop(builder);
        self.advance(node, "complete")
    }

    fn reenter_loop(&mut self, node: &'g Node, position: usize) -> Option<&'g str> {
        // Frames opened after this loop belong to inner loops that can no
        // longer continue.
        self.ctx.loop_stack.truncate(position + 1);
        let frame = self.ctx.loop_stack.last_mut()?;
        frame.current += 1.0;
        frame.iteration += 1;
        let (variable, current, end, iterations) = (
            frame.variable.clone(),
            frame.current,
            frame.end,
            frame.iteration,
        );
        self.ctx.set_variable(variable.clone(), Value::Number(current));

        if current < end {
            self.record_iteration(node);
            return self.advance(node, "body");
        }

        self.ctx.loop_stack.pop();
        let builder = StepBuilder::new(
            StepAction::Custom,
            StepEvent::LoopComplete,
            format!(
                "Loop over {} complete after {} iteration{}",
                variable,
                iterations,
                if iterations == 1 { "" } else { "s" }
            ),
        )
        .meta("loopVariable", variable)
        .meta("iterations", iterations);
        self.record_in_loop(builder);
        self.advance(node, "complete")
    }

    fn record_iteration(&mut self, node: &Node) {
        let Some(frame) = self.ctx.innermost_frame() else {
            return;
        };
        let description = format!(
            "Loop iteration {}: {} = {}",
            frame.iteration + 1,
            frame.variable,
            format_number(frame.current)
        );
        let highlighted = Value::Number(frame.current)
            .as_index()
            .filter(|i| *i < self.ctx.current_array.len());

        let mut builder = match highlighted {
            Some(i) => StepBuilder::new(StepAction::Highlight, StepEvent::LoopIteration, description)
                .highlight(i, ElementState::Highlighted),
            None => StepBuilder::new(StepAction::Custom, StepEvent::LoopIteration, description),
        };
        builder = builder
            .meta("loopNodeId", node.id.clone())
            .meta("end", frame.end);
        self.record_in_loop(builder);
    }

    fn if_condition(&mut self, node: &'g Node) -> Option<&'g str> {
        let left = self.resolve(node, "left");
        let right = self.resolve(node, "right");
        let comparator = operator(node, "==");
        let result = comparator.apply(&left, &right);

        let builder = StepBuilder::new(
            StepAction::Compare,
            StepEvent::Comparison,
            format!("Compare {} {} {} → {}", left, comparator, right, result),
        )
        .meta("left", left.to_json())
        .meta("right", right.to_json())
        .meta("operator", comparator.symbol())
        .meta("result", result);
        self.record_in_loop(builder);
        self.advance(node, if result { "true" } else { "false" })
    }

    fn array_access(&mut self, node: &'g Node) -> Option<&'g str> {
        let raw_index = self.resolve(node, "index");
        let (target, is_working_array) =
            match self.resolver.resolve_optional(node, "array", &self.ctx) {
                Some(Value::Array(items)) => (items, false),
                _ => (self.ctx.current_array.clone(), true),
            };

        match raw_index.as_index().and_then(|i| target.get(i).map(|v| (i, *v))) {
            Some((index, value)) => {
                self.ctx.outputs.insert(node.id.clone(), Value::Number(value));
                let mut builder = StepBuilder::new(
                    StepAction::Traverse,
                    StepEvent::ArrayAccess,
                    format!("Accessed array[{}] = {}", index, format_number(value)),
                )
                .meta("index", index)
                .meta("value", value);
                if is_working_array {
                    builder = builder.highlight(index, ElementState::Highlighted);
                }
                self.record_in_loop(builder);
            }
            None => {
                self.ctx.outputs.remove(&node.id);
                let message = format!(
                    "Index {} is out of bounds for an array of length {}",
                    raw_index,
                    target.len()
                );
                tracing::warn!(node = %node.id, index = %raw_index, "out-of-bounds array access");
                let builder = StepBuilder::new(StepAction::Traverse, StepEvent::ArrayAccess, message.clone())
                    .error(message)
                    .meta("outOfBounds", true)
                    .meta("index", raw_index.to_json());
                self.record_in_loop(builder);
            }
        }
        self.advance(node, EXEC_OUT)
    }

    fn array_compare(&mut self, node: &'g Node) -> Option<&'g str> {
        let (raw_i, i) = self.resolve_index(node, "i");
        let (raw_j, j) = self.resolve_index(node, "j");

        match (i, j) {
            (Some(i), Some(j)) => {
                let (a, b) = (self.ctx.current_array[i], self.ctx.current_array[j]);
                let comparator = operator(node, ">");
                let result = comparator.apply(&Value::Number(a), &Value::Number(b));
                let builder = StepBuilder::new(
                    StepAction::Compare,
                    StepEvent::ArrayCompare,
                    format!(
                        "Compare array[{}] ({}) {} array[{}] ({}) → {}",
                        i,
                        format_number(a),
                        comparator,
                        j,
                        format_number(b),
                        result
                    ),
                )
                .highlight(i, ElementState::Comparing)
                .highlight(j, ElementState::Comparing)
                .meta("i", i)
                .meta("j", j)
                .meta("operator", comparator.symbol())
                .meta("result", result);
                self.record_in_loop(builder);
            }
            _ => self.out_of_bounds(node, StepEvent::ArrayCompare, StepAction::Compare, &[raw_i, raw_j]),
        }
        self.advance(node, EXEC_OUT)
    }

    fn array_swap(&mut self, node: &'g Node) -> Option<&'g str> {
        let (raw_i, i) = self.resolve_index(node, "i");
        let (raw_j, j) = self.resolve_index(node, "j");

        match (i, j) {
            (Some(i), Some(j)) => {
                self.ctx.current_array.swap(i, j);
                let builder = StepBuilder::new(
                    StepAction::Swap,
                    StepEvent::ArraySwap,
                    format!(
                        "Swapped array[{}] = {} and array[{}] = {}",
                        i,
                        format_number(self.ctx.current_array[j]),
                        j,
                        format_number(self.ctx.current_array[i])
                    ),
                )
                .highlight(i, ElementState::Swapping)
                .highlight(j, ElementState::Swapping)
                .meta("i", i)
                .meta("j", j);
                self.record_in_loop(builder);
            }
            _ => self.out_of_bounds(node, StepEvent::ArraySwap, StepAction::Swap, &[raw_i, raw_j]),
        }
        self.advance(node, EXEC_OUT)
    }

    fn array_highlight(&mut self, node: &'g Node) -> Option<&'g str> {
        let (raw, index) = self.resolve_index(node, "index");
        match index {
            Some(i) => {
                let value = self.ctx.current_array[i];
                let description = node
                    .data_str("description")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Highlighted array[{}] = {}", i, format_number(value)));
                let builder = StepBuilder::new(StepAction::Highlight, StepEvent::ArrayHighlight, description)
                    .highlight(i, ElementState::Highlighted)
                    .meta("index", i)
                    .meta("value", value);
                self.record_in_loop(builder);
            }
            None => self.out_of_bounds(node, StepEvent::ArrayHighlight, StepAction::Highlight, &[raw]),
        }
        self.advance(node, EXEC_OUT)
    }

    fn variable_set(&mut self, node: &'g Node) -> Option<&'g str> {
        let name = node.data_str("name").unwrap_or("x").to_string();
        let from_data_flow = self.resolver.is_connected(node, "value");
        let value = self.resolve(node, "value");
        self.ctx.set_variable(name.clone(), value.clone());

        let source = if from_data_flow { "data-flow" } else { "static" };
        let builder = StepBuilder::new(
            StepAction::Custom,
            StepEvent::VariableSet,
            format!(
                "Set {} = {} ({})",
                name,
                value,
                if from_data_flow { "from connected input" } else { "static value" }
            ),
        )
        .meta("variable", name)
        .meta("value", value.to_json())
        .meta("source", source);
        self.record_in_loop(builder);
        self.advance(node, EXEC_OUT)
    }

    fn variable_get(&mut self, node: &'g Node) -> Option<&'g str> {
        let name = node.data_str("name").unwrap_or("x").to_string();
        let value = self
            .ctx
            .variable(&name)
            .cloned()
            .unwrap_or(Value::Number(0.0));
        let builder = StepBuilder::new(
            StepAction::Custom,
            StepEvent::VariableGet,
            format!("Read {} = {}", name, value),
        )
        .meta("variable", name)
        .meta("value", value.to_json());
        self.record_in_loop(builder);
        self.advance(node, EXEC_OUT)
    }

    fn counter_increment(&mut self, node: &'g Node) -> Option<&'g str> {
        let name = node.data_str("name").unwrap_or("count").to_string();
        let next = self.ctx.variable(&name).map_or(0.0, Value::as_number) + 1.0;
        self.ctx.set_variable(name.clone(), Value::Number(next));
        let builder = StepBuilder::new(
            StepAction::Custom,
            StepEvent::CounterIncrement,
            format!("Incremented {} to {}", name, format_number(next)),
        )
        .meta("variable", name)
        .meta("value", next);
        self.record_in_loop(builder);
        self.advance(node, EXEC_OUT)
    }

    fn update_description(&mut self, node: &'g Node) -> Option<&'g str> {
        let description = match node.data_str("template") {
            Some(template) => {
                let value = self.resolve(node, "value");
                render_template(template, &value, &self.ctx)
            }
            None => node
                .data_str("description")
                .unwrap_or("(no description)")
                .to_string(),
        };
        let builder = StepBuilder::new(StepAction::Custom, StepEvent::Narration, description);
        self.record_in_loop(builder);
        self.advance(node, EXEC_OUT)
    }

    fn pause(&mut self, node: &'g Node) -> Option<&'g str> {
        let duration = node
            .data
            .get("duration")
            .and_then(Value::from_literal)
            .map_or(1000.0, |v| v.as_number().max(0.0));
        let builder = StepBuilder::new(
            StepAction::Pause,
            StepEvent::Pause,
            format!("Paused for {} ms", format_number(duration)),
        )
        .meta("duration", duration);
        self.record_in_loop(builder);
        self.advance(node, EXEC_OUT)
    }
}
