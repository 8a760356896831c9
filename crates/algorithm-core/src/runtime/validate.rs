//! Structural validation of an algorithm graph before it is played.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::graph::{StartError, explicit_start_id, outgoing_edges, reachable_from, resolve_start};
use crate::core::{AlgorithmGraph, ConditionType, EdgeId, NodeId, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding about a graph. Errors make the graph unplayable in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphIssue {
    #[error("graph has no active nodes")]
    EmptyGraph,
    #[error("node id {node_id} is used more than once")]
    DuplicateNodeId { node_id: NodeId },
    #[error("edge {edge_id} references missing or inactive node {node_id}")]
    DanglingEdge { edge_id: EdgeId, node_id: NodeId },
    #[error("start node {node_id} does not exist or is inactive")]
    StartNodeNotFound { node_id: NodeId },
    #[error("no explicit start node and several start nodes: {candidates:?}")]
    AmbiguousStart { candidates: Vec<NodeId> },
    #[error("node {node_id} has unrecognized type '{raw}'")]
    UnknownNodeType { node_id: NodeId, raw: String },
    #[error("edge {edge_id} has unrecognized condition type '{raw}'")]
    UnknownConditionType { edge_id: EdgeId, raw: String },
    #[error("node {node_id} is not an end node and has no outgoing edges")]
    DeadEndNode { node_id: NodeId },
    #[error("node {node_id} is not reachable from the start node")]
    UnreachableNode { node_id: NodeId },
    #[error("no end node is reachable from the start node")]
    NoReachableEnd,
    #[error("edge {edge_id} is never taken: unconditional edge {shadowed_by} is evaluated first")]
    ShadowedEdge { edge_id: EdgeId, shadowed_by: EdgeId },
    #[error("node {node_id}: {message}")]
    FieldDecode { node_id: NodeId, message: String },
}

impl GraphIssue {
    pub fn severity(&self) -> Severity {
        match self {
            GraphIssue::EmptyGraph
            | GraphIssue::DuplicateNodeId { .. }
            | GraphIssue::DanglingEdge { .. }
            | GraphIssue::StartNodeNotFound { .. }
            | GraphIssue::AmbiguousStart { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

/// All issues found in one graph, errors first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<GraphIssue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(GraphIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &GraphIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &GraphIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Edges after the first unconditional edge out of `node_id` can never match.
fn shadowed_edges(graph: &AlgorithmGraph, node_id: NodeId, issues: &mut Vec<GraphIssue>) {
    let edges = outgoing_edges(graph, node_id);
    let Some(pos) = edges.iter().position(|e| e.is_unconditional()) else {
        return;
    };
    let shadowed_by = edges[pos].id;
    for edge in &edges[pos + 1..] {
        issues.push(GraphIssue::ShadowedEdge {
            edge_id: edge.id,
            shadowed_by,
        });
    }
}

pub fn validate_graph(graph: &AlgorithmGraph) -> ValidationReport {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    let mut active_ids = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id) {
            issues.push(GraphIssue::DuplicateNodeId { node_id: node.id });
        } else {
            shadowed_edges(graph, node.id, &mut issues);
        }
        if node.is_active {
            active_ids.insert(node.id);
        }
        if let NodeType::Unknown(raw) = &node.node_type {
            issues.push(GraphIssue::UnknownNodeType {
                node_id: node.id,
                raw: raw.clone(),
            });
        }
        for message in node.decode_issues() {
            issues.push(GraphIssue::FieldDecode {
                node_id: node.id,
                message: message.clone(),
            });
        }
    }

    for edge in graph.edges.iter().filter(|e| e.is_active) {
        for node_id in [edge.from_node_id, edge.to_node_id] {
            if !active_ids.contains(&node_id) {
                issues.push(GraphIssue::DanglingEdge {
                    edge_id: edge.id,
                    node_id,
                });
            }
        }
        if let Some(ConditionType::Unknown(raw)) = &edge.condition_type {
            issues.push(GraphIssue::UnknownConditionType {
                edge_id: edge.id,
                raw: raw.clone(),
            });
        }
    }

    if explicit_start_id(graph).is_none() {
        let candidates: Vec<NodeId> = graph
            .nodes
            .iter()
            .filter(|n| n.is_active && n.node_type == NodeType::Start)
            .map(|n| n.id)
            .collect();
        if candidates.len() > 1 {
            issues.push(GraphIssue::AmbiguousStart { candidates });
        }
    }

    match resolve_start(graph) {
        Err(StartError::Empty) => issues.push(GraphIssue::EmptyGraph),
        Err(StartError::NotFound(node_id)) => {
            issues.push(GraphIssue::StartNodeNotFound { node_id })
        }
        Ok(start) => {
            let reachable = reachable_from(graph, start.id);
            let mut any_end = false;
            for node in graph.nodes.iter().filter(|n| n.is_active) {
                if !reachable.contains(&node.id) {
                    issues.push(GraphIssue::UnreachableNode { node_id: node.id });
                    continue;
                }
                if node.node_type.is_end() {
                    any_end = true;
                } else if outgoing_edges(graph, node.id).is_empty() {
                    issues.push(GraphIssue::DeadEndNode { node_id: node.id });
                }
            }
            if !any_end {
                issues.push(GraphIssue::NoReachableEnd);
            }
        }
    }

    issues.sort_by_key(|i| i.severity() != Severity::Error);
    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AlgorithmEdge, AlgorithmNode};

    fn valid() -> AlgorithmGraph {
        AlgorithmGraph::new(1, "ok")
            .with_node(AlgorithmNode::new(1, NodeType::Start, "s"))
            .with_node(AlgorithmNode::new(2, NodeType::Decision, "d"))
            .with_node(AlgorithmNode::new(3, NodeType::End, "e"))
            .with_edge(AlgorithmEdge::new(1, 1, 2))
            .with_edge(AlgorithmEdge::new(2, 2, 3))
    }

    #[test]
    fn valid_graph_has_no_issues() {
        assert!(validate_graph(&valid()).is_empty());
    }

    #[test]
    fn dangling_edge_is_an_error() {
        let g = valid().with_edge(AlgorithmEdge::new(9, 2, 42));
        let report = validate_graph(&g);
        assert!(report.has_errors());
        assert!(report.issues.contains(&GraphIssue::DanglingEdge {
            edge_id: EdgeId(9),
            node_id: NodeId(42)
        }));
    }

    #[test]
    fn edge_to_inactive_node_is_dangling() {
        let g = valid()
            .with_node(AlgorithmNode::new(4, NodeType::End, "old").inactive())
            .with_edge(AlgorithmEdge::new(9, 2, 4));
        assert!(validate_graph(&g).has_errors());
    }

    #[test]
    fn inactive_dangling_edge_is_ignored() {
        let g = valid().with_edge(AlgorithmEdge::new(9, 2, 42).inactive());
        assert!(!validate_graph(&g).has_errors());
    }

    #[test]
    fn multiple_unmarked_start_nodes_are_ambiguous() {
        let g = valid()
            .with_node(AlgorithmNode::new(5, NodeType::Start, "s2"))
            .with_edge(AlgorithmEdge::new(5, 5, 3));
        let report = validate_graph(&g);
        assert!(report.issues.contains(&GraphIssue::AmbiguousStart {
            candidates: vec![NodeId(1), NodeId(5)]
        }));
        assert!(!validate_graph(&g.with_start(1)).has_errors());
    }

    #[test]
    fn duplicate_ids_and_missing_start_are_errors() {
        let g = valid()
            .with_node(AlgorithmNode::new(3, NodeType::End, "again"))
            .with_start(77);
        let errors: Vec<_> = validate_graph(&g).errors().cloned().collect();
        assert!(errors.contains(&GraphIssue::DuplicateNodeId { node_id: NodeId(3) }));
        assert!(errors.contains(&GraphIssue::StartNodeNotFound { node_id: NodeId(77) }));
    }

    #[test]
    fn empty_graph_is_an_error() {
        let report = validate_graph(&AlgorithmGraph::new(1, "empty"));
        assert_eq!(report.issues, vec![GraphIssue::EmptyGraph]);
    }

    #[test]
    fn warnings_do_not_block() {
        let mut g = valid()
            .with_node(AlgorithmNode::new(6, NodeType::Unknown("note".into()), "n"))
            .with_edge(AlgorithmEdge::new(6, 2, 6).with_condition(
                ConditionType::Unknown("between".into()),
                Some("1,2"),
            ));
        g.edges.retain(|e| e.id != EdgeId(2));
        let report = validate_graph(&g);
        assert!(!report.has_errors());
        let warnings: Vec<_> = report.warnings().cloned().collect();
        assert!(warnings.contains(&GraphIssue::UnknownNodeType {
            node_id: NodeId(6),
            raw: "note".into()
        }));
        assert!(warnings.contains(&GraphIssue::UnknownConditionType {
            edge_id: EdgeId(6),
            raw: "between".into()
        }));
        assert!(warnings.contains(&GraphIssue::DeadEndNode { node_id: NodeId(6) }));
        assert!(warnings.contains(&GraphIssue::UnreachableNode { node_id: NodeId(3) }));
        assert!(warnings.contains(&GraphIssue::NoReachableEnd));
    }

    #[test]
    fn edges_after_an_unconditional_edge_are_shadowed() {
        let g = valid()
            .with_node(AlgorithmNode::new(4, NodeType::End, "other"))
            .with_edge(AlgorithmEdge::new(3, 2, 4).with_label("No").with_order(1))
            .with_edge(
                AlgorithmEdge::new(4, 2, 4)
                    .with_condition(ConditionType::True, None)
                    .with_order(2),
            );
        let report = validate_graph(&g);
        assert!(!report.has_errors());
        let shadowed: Vec<_> = report
            .issues
            .iter()
            .filter(|i| matches!(i, GraphIssue::ShadowedEdge { .. }))
            .cloned()
            .collect();
        assert_eq!(
            shadowed,
            vec![
                GraphIssue::ShadowedEdge {
                    edge_id: EdgeId(3),
                    shadowed_by: EdgeId(2)
                },
                GraphIssue::ShadowedEdge {
                    edge_id: EdgeId(4),
                    shadowed_by: EdgeId(2)
                },
            ]
        );
    }

    #[test]
    fn errors_sort_before_warnings() {
        let g = valid()
            .with_node(AlgorithmNode::new(8, NodeType::Action, "orphan"))
            .with_edge(AlgorithmEdge::new(9, 2, 42));
        let report = validate_graph(&g);
        assert!(report.issues[0].is_error());
        assert!(!report.issues.last().unwrap().is_error());
    }
}
