use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::edge::AlgorithmEdge;
use super::embedded::decode_lenient;
use super::ids::{AlgorithmId, NodeId};
use super::node::AlgorithmNode;

/// Complete algorithm document: metadata plus the full node and edge lists.
/// Immutable for the duration of a play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmGraph {
    pub id: AlgorithmId,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    /// `decision_tree`, `flowchart`, `checklist`, ...
    #[serde(default)]
    pub algorithm_type: Option<String>,
    /// JSON-encoded string array as stored by the backend; see [`AlgorithmGraph::tags`].
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub start_node_id: Option<NodeId>,
    /// Start node resolved by the server, when it sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<Box<AlgorithmNode>>,
    #[serde(default)]
    pub nodes: Vec<AlgorithmNode>,
    #[serde(default)]
    pub edges: Vec<AlgorithmEdge>,
}

impl AlgorithmGraph {
    pub fn new(id: impl Into<AlgorithmId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uuid: None,
            title: title.into(),
            description: None,
            category: None,
            specialty: None,
            algorithm_type: None,
            tags: None,
            is_published: false,
            is_featured: false,
            view_count: 0,
            usage_count: 0,
            start_node_id: None,
            start_node: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: AlgorithmNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: AlgorithmEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_start(mut self, start: impl Into<NodeId>) -> Self {
        self.start_node_id = Some(start.into());
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn node(&self, id: NodeId) -> Option<&AlgorithmNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Tags decoded from their embedded form; malformed tags decode as empty.
    pub fn tags(&self) -> Vec<String> {
        let (tags, issue) = decode_lenient::<Vec<String>>("tags", self.tags.as_ref());
        if let Some(issue) = issue {
            tracing::warn!(algorithm_id = %self.id, %issue, "algorithm tags decoded with default");
        }
        tags
    }
}
