use super::definition::{Connection, Graph, Node, Position};
use crate::catalog::NodeType;
use crate::error::GraphConversionError;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// A trait for custom editor models that can be converted into a kiseki `Graph`.
///
/// This is the extension point that keeps the engine format-agnostic: implement
/// it on your own structs to translate any editor export into the canonical
/// graph the engine runs.
///
/// # Example
///
/// ```rust,no_run
/// use kiseki::prelude::*;
/// # use std::result::Result;
///
/// struct MyBlock { key: String, kind: String }
/// struct MyDiagram { blocks: Vec<MyBlock> }
///
/// impl IntoGraph for MyDiagram {
///     fn into_graph(self) -> Result<Graph, GraphConversionError> {
///         let nodes = self
///             .blocks
///             .into_iter()
///             .map(|b| {
///                 let node_type = b.kind.parse::<NodeType>().map_err(|type_name| {
///                     GraphConversionError::UnknownNodeType { node_id: b.key.clone(), type_name }
///                 })?;
///                 Ok(Node::new(b.key, node_type))
///             })
///             .collect::<Result<Vec<_>, GraphConversionError>>()?;
///         Ok(Graph::from_parts(nodes, vec![]))
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a runnable graph.
    fn into_graph(self) -> Result<Graph, GraphConversionError>;
}

impl IntoGraph for Graph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        Ok(self)
    }
}

/// The JSON layout the editor exports. Node types are kept as strings so that
/// an unknown type is reported with its node id instead of a parse error.
#[derive(Debug, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "edges")]
    pub connections: Vec<RawConnection>,
}

#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub data: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct RawConnection {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    #[serde(alias = "sourceHandle")]
    pub source_handle: String,
    pub target: String,
    #[serde(alias = "targetHandle")]
    pub target_handle: String,
}

impl RawGraph {
    pub fn from_json(json: &str) -> Result<Self, GraphConversionError> {
        serde_json::from_str(json).map_err(|e| GraphConversionError::JsonParseError(e.to_string()))
    }
}

impl IntoGraph for RawGraph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| {
                let node_type = raw.node_type.parse::<NodeType>().map_err(|type_name| {
                    GraphConversionError::UnknownNodeType {
                        node_id: raw.id.clone(),
                        type_name,
                    }
                })?;
                // Editor data is layered over the catalog defaults.
                let mut node = Node::new(raw.id, node_type).at(raw.position.unwrap_or_default());
                node.data.extend(raw.data);
                Ok(node)
            })
            .collect::<Result<Vec<_>, GraphConversionError>>()?;

        let connections = self
            .connections
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Connection {
                id: raw.id.unwrap_or_else(|| format!("conn-{}", index + 1)),
                source: raw.source,
                source_handle: raw.source_handle,
                target: raw.target,
                target_handle: raw.target_handle,
            })
            .collect();

        let graph = Graph::from_parts(nodes, connections);
        if let Some(id) = duplicate_node_id(&graph) {
            return Err(GraphConversionError::ValidationError(format!(
                "Node id '{}' is used more than once",
                id
            )));
        }
        Ok(graph)
    }
}

fn duplicate_node_id(graph: &Graph) -> Option<&str> {
    let mut seen = ahash::AHashSet::new();
    graph
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .find(|id| !seen.insert(*id))
}
