//! Common test utilities for building graphs.
use kiseki::prelude::*;

/// Fluent helper that adds nodes directly and routes every connection
/// through the validator.
pub struct TestGraph {
    pub graph: Graph,
}

#[allow(dead_code)]
impl TestGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.graph.nodes.push(node);
        self
    }

    /// Connects two handles; panics if the validator rejects the edge.
    pub fn link(mut self, source: &str, source_handle: &str, target: &str, target_handle: &str) -> Self {
        self.graph
            .connect(source, source_handle, target, target_handle)
            .unwrap_or_else(|e| panic!("{}.{} -> {}.{}: {}", source, source_handle, target, target_handle, e));
        self
    }

    /// Execution edge from a node's `exec-out` into another's `exec-in`.
    pub fn then(self, source: &str, target: &str) -> Self {
        self.link(source, "exec-out", target, "exec-in")
    }

    pub fn build(self) -> Graph {
        self.graph
    }

    pub fn execute(self, array: &[f64]) -> ExecutionOutcome {
        Engine::builder(self.graph, array.to_vec()).build().execute()
    }
}

/// Steps tagged with `event`.
#[allow(dead_code)]
pub fn steps_with(steps: &[Step], event: StepEvent) -> Vec<&Step> {
    steps.iter().filter(|s| s.is_event(event)).collect()
}

#[allow(dead_code)]
pub fn meta_f64(step: &Step, key: &str) -> f64 {
    step.meta(key)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("step '{}' has no numeric '{}'", step.description, key))
}

/// Start -> for-loop(0, end) -> array-access(i) -> if-condition(value == target),
/// both branches open; the loop's complete output goes to End.
#[allow(dead_code)]
pub fn search_graph(end: f64, target: f64) -> Graph {
    TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("start", 0).with("end", end))
        .node(Node::new("access", NodeType::ArrayAccess))
        .node(
            Node::new("check", NodeType::IfCondition)
                .with("operator", "==")
                .with("right", target),
        )
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "body", "access", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .then("access", "check")
        .link("loop", "index", "access", "index")
        .link("access", "value", "check", "left")
        .build()
}

/// Find-maximum: the true branch records the new maximum and its index, then
/// narrates it.
#[allow(dead_code)]
pub fn find_max_graph() -> Graph {
    TestGraph::new()
        .node(Node::new("start", NodeType::Start))
        .node(Node::new("loop", NodeType::ForLoop).with("start", 0).with("end", 5))
        .node(Node::new("access", NodeType::ArrayAccess))
        .node(
            Node::new("check", NodeType::IfCondition)
                .with("operator", ">")
                .with("right", "maxValue"),
        )
        .node(Node::new("set-max", NodeType::VariableSet).with("name", "maxValue"))
        .node(Node::new("set-index", NodeType::VariableSet).with("name", "maxIndex"))
        .node(
            Node::new("narrate", NodeType::UpdateDescription)
                .with("template", "New maximum {maxValue} found at index {i}"),
        )
        .node(Node::new("end", NodeType::End))
        .link("start", "exec-out", "loop", "exec-in")
        .link("loop", "body", "access", "exec-in")
        .link("loop", "complete", "end", "exec-in")
        .then("access", "check")
        .link("check", "true", "set-max", "exec-in")
        .then("set-max", "set-index")
        .then("set-index", "narrate")
        .link("loop", "index", "access", "index")
        .link("access", "value", "check", "left")
        .link("access", "value", "set-max", "value")
        .link("loop", "index", "set-index", "value")
        .build()
}
