use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every node variant the engine knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Start,
    End,
    ForLoop,
    IfCondition,
    ArrayAccess,
    ArrayCompare,
    ArraySwap,
    ArrayHighlight,
    VariableSet,
    VariableGet,
    CounterIncrement,
    UpdateDescription,
    PauseExecution,
}

impl NodeType {
    pub const ALL: [NodeType; 13] = [
        NodeType::Start,
        NodeType::End,
        NodeType::ForLoop,
        NodeType::IfCondition,
        NodeType::ArrayAccess,
        NodeType::ArrayCompare,
        NodeType::ArraySwap,
        NodeType::ArrayHighlight,
        NodeType::VariableSet,
        NodeType::VariableGet,
        NodeType::CounterIncrement,
        NodeType::UpdateDescription,
        NodeType::PauseExecution,
    ];

    /// The editor-facing type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::ForLoop => "for-loop",
            NodeType::IfCondition => "if-condition",
            NodeType::ArrayAccess => "array-access",
            NodeType::ArrayCompare => "array-compare",
            NodeType::ArraySwap => "array-swap",
            NodeType::ArrayHighlight => "array-highlight",
            NodeType::VariableSet => "variable-set",
            NodeType::VariableGet => "variable-get",
            NodeType::CounterIncrement => "counter-increment",
            NodeType::UpdateDescription => "update-description",
            NodeType::PauseExecution => "pause-execution",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
