use crate::graph::{Connection, Node};
use ahash::AHashMap;

/// Lookup tables built once per run over the authored graph.
///
/// Connections are split by the source handle's kind: execution edges map a
/// `(node, output)` pair to the next node, data edges map a `(node, input)`
/// pair to its producers in authoring order.
pub(crate) struct GraphIndex<'g> {
    nodes: AHashMap<&'g str, &'g Node>,
    execution: AHashMap<(&'g str, &'g str), &'g str>,
    data: AHashMap<(&'g str, &'g str), Vec<(&'g str, &'g str)>>,
}

impl<'g> GraphIndex<'g> {
    pub(crate) fn new(nodes: &'g [Node], connections: &'g [Connection]) -> Self {
        let mut node_map = AHashMap::with_capacity(nodes.len());
        for node in nodes {
            // First node wins on duplicate ids, matching start-node lookup.
            node_map.entry(node.id.as_str()).or_insert(node);
        }

        let mut execution = AHashMap::new();
        let mut data: AHashMap<_, Vec<_>> = AHashMap::new();
        for connection in connections {
            let source_kind = node_map
                .get(connection.source.as_str())
                .and_then(|n: &&Node| n.output_handle(&connection.source_handle))
                .map(|h| h.kind);
            let Some(kind) = source_kind else {
                tracing::warn!(
                    connection = %connection.id,
                    "ignoring connection from unknown node or handle"
                );
                continue;
            };

            let source = (connection.source.as_str(), connection.source_handle.as_str());
            let target = (connection.target.as_str(), connection.target_handle.as_str());
            if kind.is_execution() {
                execution.entry(source).or_insert(target.0);
            } else {
                data.entry(target).or_default().push(source);
            }
        }

        Self {
            nodes: node_map,
            execution,
            data,
        }
    }

    pub(crate) fn node(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    /// The node an execution output leads to, if connected.
    pub(crate) fn next(&self, node_id: &str, handle: &str) -> Option<&'g str> {
        self.execution.get(&(node_id, handle)).copied()
    }

    /// The first data producer feeding `(node_id, handle)`.
    pub(crate) fn data_source(&self, node_id: &str, handle: &str) -> Option<(&'g str, &'g str)> {
        self.data
            .get(&(node_id, handle))
            .and_then(|sources| sources.first().copied())
    }
}
