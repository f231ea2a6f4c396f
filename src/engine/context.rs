use crate::error::ExecutionError;
use crate::graph::NodeId;
use crate::value::Value;
use ahash::AHashMap;
use serde_json::{Map, Value as JsonValue};

/// Live state of one active for-loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopFrame {
    pub node_id: NodeId,
    pub variable: String,
    pub current: f64,
    pub end: f64,
    /// Zero-based count of iterations entered so far.
    pub iteration: usize,
}

/// Mutable state threaded through one run. Created fresh per run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub variables: AHashMap<String, Value>,
    pub current_array: Vec<f64>,
    /// Active loops, innermost last.
    pub loop_stack: Vec<LoopFrame>,
    /// Array-access reads from the node's last dispatch, keyed by node id.
    pub outputs: AHashMap<NodeId, Value>,
    pub is_complete: bool,
    pub error: Option<ExecutionError>,
}

impl ExecutionContext {
    pub fn new(initial_array: &[f64]) -> Self {
        Self {
            current_array: initial_array.to_vec(),
            ..Self::default()
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn innermost_frame(&self) -> Option<&LoopFrame> {
        self.loop_stack.last()
    }

    pub fn frame_for(&self, node_id: &str) -> Option<&LoopFrame> {
        self.loop_stack.iter().rev().find(|f| f.node_id == node_id)
    }

    /// Metadata describing the innermost loop, empty outside loops.
    pub fn loop_context(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        if let Some(frame) = self.innermost_frame() {
            map.insert("loopVariable".to_string(), JsonValue::from(frame.variable.clone()));
            map.insert("loopValue".to_string(), serde_json::json!(frame.current));
            map.insert("loopIteration".to_string(), JsonValue::from(frame.iteration + 1));
        }
        map
    }

    /// Variable bindings as JSON, sorted by name.
    pub fn variables_json(&self) -> Map<String, JsonValue> {
        let mut names: Vec<_> = self.variables.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| (name.clone(), self.variables[name].to_json()))
            .collect()
    }
}
