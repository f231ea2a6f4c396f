use crate::catalog::{self, HandleSpec, NodeTemplate, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub type NodeId = String;
pub type ConnectionId = String;

/// Canvas position of a node. Cosmetic only; the engine never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One vertex of the authored graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    /// Named parameters; literal fallbacks for inputs are stored under the
    /// input handle's id.
    #[serde(default)]
    pub data: Map<String, JsonValue>,
}

impl Node {
    /// Creates a node carrying its type's default parameters.
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        let data = catalog::template(node_type)
            .map(|t| t.default_data.clone())
            .unwrap_or_default();
        Self {
            id: id.into(),
            node_type,
            position: Position::default(),
            data,
        }
    }

    /// Sets one data-bag entry, builder style.
    pub fn with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn template(&self) -> Option<&'static NodeTemplate> {
        catalog::template(self.node_type)
    }

    pub fn input_handle(&self, id: &str) -> Option<&'static HandleSpec> {
        self.template().and_then(|t| t.input(id))
    }

    pub fn output_handle(&self, id: &str) -> Option<&'static HandleSpec> {
        self.template().and_then(|t| t.output(id))
    }

    /// Reads a string parameter, treating empty strings as absent.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// One edge of the authored graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
}

impl Connection {
    pub fn new(
        id: impl Into<ConnectionId>,
        source: impl Into<NodeId>,
        source_handle: impl Into<String>,
        target: impl Into<NodeId>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }

    pub fn matches(&self, proposal: &ConnectionProposal) -> bool {
        self.source == proposal.source
            && self.source_handle == proposal.source_handle
            && self.target == proposal.target
            && self.target_handle == proposal.target_handle
    }
}

/// A connection the editor would like to add, before it receives an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProposal {
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
}

impl ConnectionProposal {
    pub fn new(
        source: impl Into<NodeId>,
        source_handle: impl Into<String>,
        target: impl Into<NodeId>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }
}

/// The authored graph: ordered nodes and ordered connections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(skip)]
    pub(super) next_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from already-authored parts without re-validating edges.
    pub fn from_parts(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self {
            nodes,
            connections,
            next_id: 0,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections arriving at `(node_id, handle)`, in authoring order.
    pub fn incoming<'a>(
        &'a self,
        node_id: &'a str,
        handle: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.target == node_id && c.target_handle == handle)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }
}
