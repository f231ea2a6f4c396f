use super::definition::{Connection, ConnectionProposal, Graph, NodeId};
use crate::catalog::NodeType;
use crate::error::ConnectionRejection;
use ahash::AHashSet;
use itertools::Itertools;
use serde::Serialize;
use std::collections::VecDeque;

/// Checks a proposed edge against the graph it would join.
///
/// Checks run in a fixed order and the first failure wins: self-loop,
/// duplicate, unknown endpoint, kind mismatch, execution fan-in/fan-out.
pub fn validate_connection(
    graph: &Graph,
    proposal: &ConnectionProposal,
) -> Result<(), ConnectionRejection> {
    check_proposal(graph, &graph.connections, proposal)
}

/// Node lookups go through `graph`; duplicate and fan checks only consider
/// `existing`.
fn check_proposal(
    graph: &Graph,
    existing: &[Connection],
    proposal: &ConnectionProposal,
) -> Result<(), ConnectionRejection> {
    if proposal.source == proposal.target {
        return Err(ConnectionRejection::SelfLoop(proposal.source.clone()));
    }

    if existing.iter().any(|c| c.matches(proposal)) {
        return Err(ConnectionRejection::Duplicate {
            source_node: proposal.source.clone(),
            source_handle: proposal.source_handle.clone(),
            target_node: proposal.target.clone(),
            target_handle: proposal.target_handle.clone(),
        });
    }

    let source_node = graph
        .node(&proposal.source)
        .ok_or_else(|| ConnectionRejection::UnknownNode(proposal.source.clone()))?;
    let target_node = graph
        .node(&proposal.target)
        .ok_or_else(|| ConnectionRejection::UnknownNode(proposal.target.clone()))?;

    let source_handle = source_node
        .output_handle(&proposal.source_handle)
        .ok_or_else(|| ConnectionRejection::UnknownHandle {
            node_id: source_node.id.clone(),
            handle: proposal.source_handle.clone(),
            direction: "output",
        })?;
    let target_handle = target_node
        .input_handle(&proposal.target_handle)
        .ok_or_else(|| ConnectionRejection::UnknownHandle {
            node_id: target_node.id.clone(),
            handle: proposal.target_handle.clone(),
            direction: "input",
        })?;

    if !source_handle.kind.is_compatible_with(target_handle.kind) {
        return Err(ConnectionRejection::KindMismatch {
            source_kind: source_handle.kind,
            target_kind: target_handle.kind,
        });
    }

    if source_handle.kind.is_execution() {
        if existing
            .iter()
            .any(|c| c.source == proposal.source && c.source_handle == proposal.source_handle)
        {
            return Err(ConnectionRejection::FanViolation {
                node_id: proposal.source.clone(),
                handle: proposal.source_handle.clone(),
                existing: "an outgoing connection",
            });
        }
        if existing
            .iter()
            .any(|c| c.target == proposal.target && c.target_handle == proposal.target_handle)
        {
            return Err(ConnectionRejection::FanViolation {
                node_id: proposal.target.clone(),
                handle: proposal.target_handle.clone(),
                existing: "an incoming connection",
            });
        }
    }

    Ok(())
}

/// A single finding from [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub node_id: Option<NodeId>,
    pub message: String,
}

impl ValidationIssue {
    fn graph(message: impl Into<String>) -> Self {
        Self {
            node_id: None,
            message: message.into(),
        }
    }

    fn node(node_id: &str, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.to_string()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Whole-graph check run before execution.
///
/// Errors make the graph unrunnable or ambiguous. Warnings flag authoring
/// mistakes the engine tolerates at runtime.
pub fn validate(graph: &Graph) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let starts: Vec<_> = graph.nodes_of_type(NodeType::Start).collect();
    match starts.len() {
        0 => errors.push(ValidationIssue::graph("Graph has no start node")),
        1 => {}
        n => errors.push(ValidationIssue::graph(format!(
            "Graph has {} start nodes ({}); exactly one is allowed",
            n,
            starts.iter().map(|s| s.id.as_str()).join(", ")
        ))),
    }
    if graph.nodes_of_type(NodeType::End).next().is_none() {
        errors.push(ValidationIssue::graph("Graph has no end node"));
    }

    check_connections(graph, &mut errors);

    if let Some(start) = starts.first() {
        let reachable = reachable_from(graph, &start.id);
        for node in &graph.nodes {
            if !reachable.contains(node.id.as_str()) {
                warnings.push(ValidationIssue::node(
                    &node.id,
                    format!(
                        "{} node is not reachable from the start node",
                        node.template().map_or(node.node_type.as_str(), |t| t.label)
                    ),
                ));
            }
        }
    }

    check_unresolved_inputs(graph, &mut warnings);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Re-checks every stored connection. Graphs assembled through
/// [`Graph::from_parts`] never went through [`validate_connection`].
fn check_connections(graph: &Graph, errors: &mut Vec<ValidationIssue>) {
    for (index, connection) in graph.connections.iter().enumerate() {
        let (Some(source), Some(target)) =
            (graph.node(&connection.source), graph.node(&connection.target))
        else {
            errors.push(ValidationIssue::graph(format!(
                "Connection '{}' references a node that does not exist",
                connection.id
            )));
            continue;
        };

        let proposal = ConnectionProposal::new(
            connection.source.clone(),
            connection.source_handle.clone(),
            connection.target.clone(),
            connection.target_handle.clone(),
        );
        // Only connections authored before this one count as existing.
        if let Err(reason) = check_proposal(graph, &graph.connections[..index], &proposal) {
            errors.push(ValidationIssue::node(
                &target.id,
                format!(
                    "Connection '{}' from '{}' is invalid: {}",
                    connection.id, source.id, reason
                ),
            ));
        }
    }
}

/// Nodes reachable from `start_id` along execution edges, plus the data
/// producers they read from.
fn reachable_from<'a>(graph: &'a Graph, start_id: &'a str) -> AHashSet<&'a str> {
    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([start_id]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let Some(node) = graph.node(id) else {
            continue;
        };
        for connection in graph.connections.iter().filter(|c| c.source == id) {
            if node
                .output_handle(&connection.source_handle)
                .is_some_and(|h| h.kind.is_execution())
            {
                queue.push_back(connection.target.as_str());
            }
        }
        for connection in graph.connections.iter().filter(|c| c.target == id) {
            if node
                .input_handle(&connection.target_handle)
                .is_some_and(|h| !h.kind.is_execution())
            {
                queue.push_back(connection.source.as_str());
            }
        }
    }
    seen
}

fn check_unresolved_inputs(graph: &Graph, warnings: &mut Vec<ValidationIssue>) {
    for node in &graph.nodes {
        let Some(template) = node.template() else {
            continue;
        };
        for handle in template.inputs.iter().filter(|h| !h.kind.is_execution()) {
            // An unconnected array input reads the working array.
            if node.node_type == NodeType::ArrayAccess && handle.id == "array" {
                continue;
            }
            let connected = graph.incoming(&node.id, handle.id).next().is_some();
            let has_literal = node.data.get(handle.id).is_some_and(|v| !v.is_null());
            if !connected && !has_literal {
                warnings.push(ValidationIssue::node(
                    &node.id,
                    format!(
                        "Input '{}' has no connection and no literal; it will read as {}",
                        handle.id,
                        crate::value::Value::zero_for(handle.kind)
                    ),
                ));
            }
        }
    }
}
