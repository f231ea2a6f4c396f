//! The static node catalog: one template per [`NodeType`], declaring its
//! handles and default parameters.

mod handle;
mod node_type;

pub use handle::*;
pub use node_type::*;

use ahash::AHashMap;
use serde_json::{Map, Value as JsonValue, json};
use std::sync::LazyLock;

/// Handle id of the single execution input most node types carry.
pub const EXEC_IN: &str = "exec-in";
/// Handle id of the single execution output most node types carry.
pub const EXEC_OUT: &str = "exec-out";

/// Declared shape of a node type.
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    pub node_type: NodeType,
    pub label: &'static str,
    pub inputs: Vec<HandleSpec>,
    pub outputs: Vec<HandleSpec>,
    pub default_data: Map<String, JsonValue>,
}

impl NodeTemplate {
    pub fn input(&self, id: &str) -> Option<&HandleSpec> {
        self.inputs.iter().find(|h| h.id == id)
    }

    pub fn output(&self, id: &str) -> Option<&HandleSpec> {
        self.outputs.iter().find(|h| h.id == id)
    }
}

/// Defines the catalog table and its lookup in one place so that every
/// variant gets an entry.
macro_rules! define_catalog {
    ( $( $variant:ident => {
        label: $label:expr,
        inputs: [ $( ($in_id:expr, $in_kind:ident) ),* $(,)? ],
        outputs: [ $( ($out_id:expr, $out_kind:ident) ),* $(,)? ],
        data: $data:tt $(,)?
    } ),* $(,)? ) => {
        fn build_catalog() -> AHashMap<NodeType, NodeTemplate> {
            let mut table = AHashMap::new();
            $(
                let default_data = match json!($data) {
                    JsonValue::Object(map) => map,
                    _ => Map::new(),
                };
                table.insert(
                    NodeType::$variant,
                    NodeTemplate {
                        node_type: NodeType::$variant,
                        label: $label,
                        inputs: vec![ $( HandleSpec::input($in_id, HandleKind::$in_kind) ),* ],
                        outputs: vec![ $( HandleSpec::output($out_id, HandleKind::$out_kind) ),* ],
                        default_data,
                    },
                );
            )*
            table
        }
    };
}

define_catalog! {
    Start => {
        label: "Start",
        inputs: [],
        outputs: [(EXEC_OUT, Execution)],
        data: { "label": "Start" },
    },
    End => {
        label: "End",
        inputs: [(EXEC_IN, Execution)],
        outputs: [],
        data: { "label": "End" },
    },
    ForLoop => {
        label: "For Loop",
        inputs: [(EXEC_IN, Execution), ("start", Number), ("end", Number)],
        outputs: [("body", Execution), ("complete", Execution), ("index", Number)],
        data: { "variable": "i", "start": 0, "end": 5 },
    },
    IfCondition => {
        label: "If Condition",
        inputs: [(EXEC_IN, Execution), ("left", Any), ("right", Any)],
        outputs: [("true", Execution), ("false", Execution), ("result", Boolean)],
        data: { "operator": "==", "left": 0, "right": 0 },
    },
    ArrayAccess => {
        label: "Array Access",
        inputs: [(EXEC_IN, Execution), ("index", Number), ("array", Array)],
        outputs: [(EXEC_OUT, Execution), ("value", Number)],
        data: { "index": 0 },
    },
    ArrayCompare => {
        label: "Array Compare",
        inputs: [(EXEC_IN, Execution), ("i", Number), ("j", Number)],
        outputs: [(EXEC_OUT, Execution), ("result", Boolean)],
        data: { "i": 0, "j": 1, "operator": ">" },
    },
    ArraySwap => {
        label: "Array Swap",
        inputs: [(EXEC_IN, Execution), ("i", Number), ("j", Number)],
        outputs: [(EXEC_OUT, Execution)],
        data: { "i": 0, "j": 1 },
    },
    ArrayHighlight => {
        label: "Array Highlight",
        inputs: [(EXEC_IN, Execution), ("index", Number)],
        outputs: [(EXEC_OUT, Execution)],
        data: { "index": 0 },
    },
    VariableSet => {
        label: "Set Variable",
        inputs: [(EXEC_IN, Execution), ("value", Any)],
        outputs: [(EXEC_OUT, Execution), ("value", Any)],
        data: { "name": "x", "value": 0 },
    },
    VariableGet => {
        label: "Get Variable",
        inputs: [(EXEC_IN, Execution)],
        outputs: [(EXEC_OUT, Execution), ("value", Any)],
        data: { "name": "x" },
    },
    CounterIncrement => {
        label: "Increment Counter",
        inputs: [(EXEC_IN, Execution)],
        outputs: [(EXEC_OUT, Execution), ("value", Number)],
        data: { "name": "count" },
    },
    UpdateDescription => {
        label: "Update Description",
        inputs: [(EXEC_IN, Execution), ("value", Any)],
        outputs: [(EXEC_OUT, Execution)],
        data: { "template": "", "description": "" },
    },
    PauseExecution => {
        label: "Pause",
        inputs: [(EXEC_IN, Execution)],
        outputs: [(EXEC_OUT, Execution)],
        data: { "duration": 1000 },
    },
}

static CATALOG: LazyLock<AHashMap<NodeType, NodeTemplate>> = LazyLock::new(build_catalog);

/// Looks up the template for a node type.
pub fn template(node_type: NodeType) -> Option<&'static NodeTemplate> {
    CATALOG.get(&node_type)
}

/// All templates, in [`NodeType::ALL`] order.
pub fn templates() -> impl Iterator<Item = &'static NodeTemplate> {
    NodeType::ALL.into_iter().filter_map(template)
}
