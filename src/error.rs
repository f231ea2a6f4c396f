use crate::catalog::HandleKind;
use thiserror::Error;

/// Reasons a proposed connection is refused by the validator.
/// Variants are listed in the order the checks run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRejection {
    #[error("Node '{0}' cannot connect to itself")]
    SelfLoop(String),

    #[error("An identical connection from '{source_node}.{source_handle}' to '{target_node}.{target_handle}' already exists")]
    Duplicate {
        source_node: String,
        source_handle: String,
        target_node: String,
        target_handle: String,
    },

    #[error("Node '{0}' was not found in the graph")]
    UnknownNode(String),

    #[error("Node '{node_id}' has no {direction} handle named '{handle}'")]
    UnknownHandle {
        node_id: String,
        handle: String,
        direction: &'static str,
    },

    #[error("A {source_kind} output cannot feed a {target_kind} input")]
    KindMismatch {
        source_kind: HandleKind,
        target_kind: HandleKind,
    },

    #[error("Execution handle '{node_id}.{handle}' already has {existing}")]
    FanViolation {
        node_id: String,
        handle: String,
        existing: &'static str,
    },
}

/// Errors raised by graph-authoring operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Connection rejected: {0}")]
    ConnectionRejected(#[from] ConnectionRejection),
}

/// Fatal errors that abort an engine run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("No start node found in the graph")]
    MissingStart,

    #[error("Execution reached node '{node_id}' (from '{source_node_id}'), which is not in the graph")]
    NodeNotFound {
        node_id: String,
        source_node_id: String,
    },

    #[error("Execution stopped after reaching the limit of {limit} steps")]
    StepLimitExceeded { limit: usize },
}

/// Errors that can occur when converting a custom editor format into a `Graph`.
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Node '{node_id}' has an unknown node type: '{type_name}'")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("Invalid graph data: {0}")]
    ValidationError(String),

    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),
}
