use super::comparator::Comparator;
use super::context::ExecutionContext;
use super::index::GraphIndex;
use crate::catalog::{HandleKind, NodeType};
use crate::graph::Node;
use crate::value::Value;
use serde_json::Value as JsonValue;

/// Resolves node inputs on demand against the current context.
///
/// Nothing is cached between calls: a producer's data output is recomputed
/// each time it is read, so values read inside a loop track the current
/// iteration. Within one dispatch the context does not change, so repeated
/// reads of the same input agree.
#[derive(Clone, Copy)]
pub(crate) struct DataResolver<'g> {
    index: &'g GraphIndex<'g>,
}

impl<'g> DataResolver<'g> {
    pub(crate) fn new(index: &'g GraphIndex<'g>) -> Self {
        Self { index }
    }

    /// Effective value of `node`'s input `handle`, or the handle kind's zero
    /// value when neither a connection nor a literal supplies one.
    pub(crate) fn resolve(&self, node: &'g Node, handle: &str, ctx: &ExecutionContext) -> Value {
        self.resolve_optional(node, handle, ctx)
            .unwrap_or_else(|| Value::zero_for(input_kind(node, handle)))
    }

    /// Like [`resolve`](Self::resolve) but reports an input with no
    /// connection and no literal as `None`.
    pub(crate) fn resolve_optional(
        &self,
        node: &'g Node,
        handle: &str,
        ctx: &ExecutionContext,
    ) -> Option<Value> {
        self.resolve_guarded(node, handle, ctx, &mut Vec::new())
    }

    pub(crate) fn is_connected(&self, node: &Node, handle: &str) -> bool {
        self.index.data_source(&node.id, handle).is_some()
    }

    fn resolve_guarded(
        &self,
        node: &'g Node,
        handle: &str,
        ctx: &ExecutionContext,
        visiting: &mut Vec<&'g str>,
    ) -> Option<Value> {
        if let Some((producer_id, output)) = self.index.data_source(&node.id, handle) {
            if let Some(producer) = self.index.node(producer_id) {
                return Some(self.output(producer, output, ctx, visiting));
            }
        }
        node.data
            .get(handle)
            .and_then(|literal| literal_value(literal, ctx))
    }

    /// A producer's data output, computed against the current context.
    fn output(
        &self,
        producer: &'g Node,
        output: &str,
        ctx: &ExecutionContext,
        visiting: &mut Vec<&'g str>,
    ) -> Value {
        let kind = producer
            .output_handle(output)
            .map_or(HandleKind::Any, |h| h.kind);
        if visiting.contains(&producer.id.as_str()) {
            tracing::warn!(node = %producer.id, "data cycle detected, reading zero value");
            return Value::zero_for(kind);
        }
        visiting.push(producer.id.as_str());

        let value = match producer.node_type {
            NodeType::ForLoop => ctx
                .frame_for(&producer.id)
                .map(|frame| Value::Number(frame.current))
                .or_else(|| {
                    ctx.variable(producer.data_str("variable").unwrap_or("i"))
                        .cloned()
                }),
            NodeType::IfCondition => {
                let left = self.resolve_or_zero(producer, "left", ctx, visiting);
                let right = self.resolve_or_zero(producer, "right", ctx, visiting);
                Some(Value::Bool(operator(producer, "==").apply(&left, &right)))
            }
            NodeType::ArrayAccess => ctx.outputs.get(&producer.id).cloned().or_else(|| {
                let index = self.resolve_or_zero(producer, "index", ctx, visiting);
                let array = match self.resolve_guarded(producer, "array", ctx, visiting) {
                    Some(Value::Array(items)) => items,
                    _ => ctx.current_array.clone(),
                };
                index
                    .as_index()
                    .and_then(|i| array.get(i).copied())
                    .map(Value::Number)
            }),
            NodeType::ArrayCompare => {
                let i = self.resolve_or_zero(producer, "i", ctx, visiting).as_index();
                let j = self.resolve_or_zero(producer, "j", ctx, visiting).as_index();
                let a = i.and_then(|i| ctx.current_array.get(i));
                let b = j.and_then(|j| ctx.current_array.get(j));
                a.zip(b).map(|(a, b)| {
                    Value::Bool(operator(producer, ">").apply(&Value::Number(*a), &Value::Number(*b)))
                })
            }
            NodeType::VariableSet | NodeType::VariableGet => {
                ctx.variable(producer.data_str("name").unwrap_or("x")).cloned()
            }
            NodeType::CounterIncrement => {
                ctx.variable(producer.data_str("name").unwrap_or("count")).cloned()
            }
            NodeType::Start
            | NodeType::End
            | NodeType::ArraySwap
            | NodeType::ArrayHighlight
            | NodeType::UpdateDescription
            | NodeType::PauseExecution => None,
        };

        visiting.pop();
        value.unwrap_or_else(|| Value::zero_for(kind))
    }

    fn resolve_or_zero(
        &self,
        node: &'g Node,
        handle: &str,
        ctx: &ExecutionContext,
        visiting: &mut Vec<&'g str>,
    ) -> Value {
        self.resolve_guarded(node, handle, ctx, visiting)
            .unwrap_or_else(|| Value::zero_for(input_kind(node, handle)))
    }
}

/// Reads the node's comparison operator, falling back to `default` when the
/// parameter is missing or unrecognised.
pub(crate) fn operator(node: &Node, default: &str) -> Comparator {
    let symbol = node.data_str("operator").unwrap_or(default);
    symbol.parse().unwrap_or_else(|unknown: String| {
        tracing::warn!(node = %node.id, operator = %unknown, "unknown operator, using {}", default);
        default.parse().unwrap_or(Comparator::Equal)
    })
}

fn input_kind(node: &Node, handle: &str) -> HandleKind {
    node.input_handle(handle).map_or(HandleKind::Any, |h| h.kind)
}

/// Converts a data-bag literal. A string naming a bound variable reads that
/// variable.
fn literal_value(literal: &JsonValue, ctx: &ExecutionContext) -> Option<Value> {
    if let JsonValue::String(name) = literal {
        if let Some(bound) = ctx.variable(name.trim()) {
            return Some(bound.clone());
        }
    }
    Value::from_literal(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Connection;

    #[test]
    fn unresolved_inputs_read_as_the_zero_of_their_kind() {
        let mut access = Node::new("access", NodeType::ArrayAccess);
        access.data.remove("index");
        let nodes = vec![
            access,
            Node::new("cmp", NodeType::ArrayCompare).with("i", 5).with("j", 6),
            Node::new("check", NodeType::IfCondition),
        ];
        let connections = vec![Connection::new("c1", "cmp", "result", "check", "left")];
        let index = GraphIndex::new(&nodes, &connections);
        let resolver = DataResolver::new(&index);
        let ctx = ExecutionContext::new(&[1.0, 2.0]);

        assert_eq!(resolver.resolve(&nodes[0], "index", &ctx), Value::Number(0.0));
        assert_eq!(resolver.resolve(&nodes[0], "array", &ctx), Value::Array(Vec::new()));
        assert_eq!(resolver.resolve_optional(&nodes[0], "array", &ctx), None);
        // Out-of-range indices leave the compare result unresolved.
        assert_eq!(resolver.resolve(&nodes[2], "left", &ctx), Value::Bool(false));
    }

    #[test]
    fn array_compare_output_tracks_the_current_array() {
        let nodes = vec![
            Node::new("cmp", NodeType::ArrayCompare).with("i", 0).with("j", 1),
            Node::new("check", NodeType::IfCondition),
        ];
        let connections = vec![Connection::new("c1", "cmp", "result", "check", "left")];
        let index = GraphIndex::new(&nodes, &connections);
        let resolver = DataResolver::new(&index);

        let mut ctx = ExecutionContext::new(&[8.0, 2.0]);
        assert_eq!(resolver.resolve(&nodes[1], "left", &ctx), Value::Bool(true));
        ctx.current_array.swap(0, 1);
        assert_eq!(resolver.resolve(&nodes[1], "left", &ctx), Value::Bool(false));
    }
}
