use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Display state of one array element in a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    #[default]
    Default,
    Comparing,
    Swapping,
    Highlighted,
}

/// Coarse category of a step, used by playback to pick an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Compare,
    Swap,
    Traverse,
    Highlight,
    Pause,
    Custom,
}

/// Fine-grained event tag stored under the `event` metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepEvent {
    Started,
    Completed,
    PathEnded,
    LoopIteration,
    LoopSkipped,
    LoopComplete,
    LoopBodyComplete,
    Comparison,
    ArrayAccess,
    ArrayCompare,
    ArraySwap,
    ArrayHighlight,
    VariableSet,
    VariableGet,
    CounterIncrement,
    Narration,
    Pause,
    Error,
}

impl StepEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            StepEvent::Started => "started",
            StepEvent::Completed => "completed",
            StepEvent::PathEnded => "path-ended",
            StepEvent::LoopIteration => "loop-iteration",
            StepEvent::LoopSkipped => "loop-skipped",
            StepEvent::LoopComplete => "loop-complete",
            StepEvent::LoopBodyComplete => "loop-body-complete",
            StepEvent::Comparison => "comparison",
            StepEvent::ArrayAccess => "array-access",
            StepEvent::ArrayCompare => "array-compare",
            StepEvent::ArraySwap => "array-swap",
            StepEvent::ArrayHighlight => "array-highlight",
            StepEvent::VariableSet => "variable-set",
            StepEvent::VariableGet => "variable-get",
            StepEvent::CounterIncrement => "counter-increment",
            StepEvent::Narration => "narration",
            StepEvent::Pause => "pause",
            StepEvent::Error => "error",
        }
    }
}

/// One element of an array snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayElement {
    pub value: f64,
    pub state: ElementState,
    pub position: usize,
}

/// One immutable visualization snapshot.
///
/// Steps are full snapshots, not deltas, so playback can seek to any index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub array_state: Vec<ArrayElement>,
    pub highlighted_indices: Vec<usize>,
    pub description: String,
    pub action: StepAction,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, JsonValue>,
}

impl Step {
    pub fn event(&self) -> Option<&str> {
        self.metadata.get("event").and_then(|v| v.as_str())
    }

    pub fn is_event(&self, event: StepEvent) -> bool {
        self.event() == Some(event.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.metadata
            .get("error")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn meta(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// The element values of the snapshot, without display state.
    pub fn values(&self) -> Vec<f64> {
        self.array_state.iter().map(|e| e.value).collect()
    }
}
