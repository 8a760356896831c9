//! Graph helpers for playing an algorithm: outgoing edges in evaluation order,
//! successors, predecessors, start-node resolution, reachability.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{AlgorithmEdge, AlgorithmGraph, AlgorithmNode, NodeId, NodeType};

/// Why no effective start node could be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// The graph has no active nodes.
    Empty,
    /// An explicit start id points at a missing or inactive node.
    NotFound(NodeId),
}

/// Active edges leaving `from_id`, in ascending `order_index`. Ties keep list order.
pub fn outgoing_edges(graph: &AlgorithmGraph, from_id: NodeId) -> Vec<&AlgorithmEdge> {
    let mut edges: Vec<&AlgorithmEdge> = graph
        .edges
        .iter()
        .filter(|e| e.is_active && e.from_node_id == from_id)
        .collect();
    edges.sort_by_key(|e| e.order_index);
    edges
}

/// Nodes that have an active edge from `from_id`, in evaluation order.
pub fn successors(graph: &AlgorithmGraph, from_id: NodeId) -> Vec<NodeId> {
    outgoing_edges(graph, from_id)
        .into_iter()
        .map(|e| e.to_node_id)
        .collect()
}

/// Nodes that have an active edge to `to_id`.
pub fn predecessors(graph: &AlgorithmGraph, to_id: NodeId) -> Vec<NodeId> {
    graph
        .edges
        .iter()
        .filter(|e| e.is_active && e.to_node_id == to_id)
        .map(|e| e.from_node_id)
        .collect()
}

/// Explicit start id: `start_node_id`, else the id of the embedded `start_node`.
pub fn explicit_start_id(graph: &AlgorithmGraph) -> Option<NodeId> {
    graph
        .start_node_id
        .or_else(|| graph.start_node.as_ref().map(|n| n.id))
}

/// Resolve the effective start node: explicit id, else the first active
/// `start` node, else the first active node.
pub fn resolve_start(graph: &AlgorithmGraph) -> Result<&AlgorithmNode, StartError> {
    let active = || graph.nodes.iter().filter(|n| n.is_active);
    if let Some(id) = explicit_start_id(graph) {
        return active()
            .find(|n| n.id == id)
            .ok_or(StartError::NotFound(id));
    }
    active()
        .find(|n| n.node_type == NodeType::Start)
        .or_else(|| active().next())
        .ok_or(StartError::Empty)
}

/// Active nodes reachable from `start` over active edges (including `start`).
pub fn reachable_from(graph: &AlgorithmGraph, start: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        for next in successors(graph, id) {
            if !seen.contains(&next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Lookup table from node id to position in `graph.nodes`, built once per session.
/// The first active node wins when ids repeat.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    positions: HashMap<NodeId, usize>,
}

impl NodeIndex {
    pub fn build(graph: &AlgorithmGraph) -> Self {
        let mut positions = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            if node.is_active {
                positions.entry(node.id).or_insert(i);
            }
        }
        Self { positions }
    }

    pub fn get<'g>(&self, graph: &'g AlgorithmGraph, id: NodeId) -> Option<&'g AlgorithmNode> {
        self.positions.get(&id).and_then(|&i| graph.nodes.get(i))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }
}
