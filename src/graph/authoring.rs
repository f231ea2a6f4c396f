use super::definition::{
    Connection, ConnectionId, ConnectionProposal, Graph, Node, NodeId, Position,
};
use super::validator::validate_connection;
use crate::catalog::NodeType;
use crate::error::{ConnectionRejection, GraphError};
use serde_json::{Map, Value as JsonValue};

/// Editing operations exposed to the graph editor.
impl Graph {
    /// Adds a node with its type's default parameters and returns its new id.
    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> NodeId {
        let id = self.fresh_id(node_type.as_str());
        self.nodes.push(Node::new(id.clone(), node_type).at(position));
        id
    }

    /// Removes a node and every connection touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        self.connections.retain(|c| c.source != id && c.target != id);
        Ok(self.nodes.remove(index))
    }

    /// Merges `partial` into the node's data bag, overwriting existing keys.
    pub fn update_node(
        &mut self,
        id: &str,
        partial: Map<String, JsonValue>,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        node.data.extend(partial);
        Ok(())
    }

    /// Validates and inserts a connection. A rejected proposal leaves the
    /// graph unchanged.
    pub fn add_connection(
        &mut self,
        proposal: ConnectionProposal,
    ) -> Result<ConnectionId, ConnectionRejection> {
        validate_connection(self, &proposal)?;
        let id = self.fresh_id("conn");
        self.connections.push(Connection {
            id: id.clone(),
            source: proposal.source,
            source_handle: proposal.source_handle,
            target: proposal.target,
            target_handle: proposal.target_handle,
        });
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: &str) -> Result<Connection, GraphError> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| GraphError::ConnectionNotFound(id.to_string()))?;
        Ok(self.connections.remove(index))
    }

    /// Convenience wrapper for editors that build graphs programmatically.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<ConnectionId, GraphError> {
        Ok(self.add_connection(ConnectionProposal::new(
            source,
            source_handle,
            target,
            target_handle,
        ))?)
    }

    /// Generates an id not used by any node or connection.
    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("{}-{}", prefix, self.next_id);
            let taken = self.nodes.iter().any(|n| n.id == candidate)
                || self.connections.iter().any(|c| c.id == candidate);
            if !taken {
                return candidate;
            }
        }
    }
}
