use thiserror::Error;

use crate::core::{AlgorithmId, EdgeId, NodeId};
use crate::runtime::GraphIssue;

/// Failure reported by an [`AlgorithmSource`](crate::source::AlgorithmSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("algorithm {0} not found")]
    NotFound(AlgorithmId),
    #[error("transport error: {0}")]
    Transport(String),
    /// The payload was received but is not a valid algorithm document.
    #[error("invalid algorithm document: {0}")]
    Decode(String),
}

/// Loading an algorithm failed; no session state was created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("algorithm {0} has no playable nodes")]
    EmptyGraph(AlgorithmId),
}

/// Errors surfaced by the player's navigation channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("failed to load algorithm: {0}")]
    Load(#[from] LoadError),
    /// Authored content is corrupt: an edge points at a node that is not in the graph.
    #[error("edge {edge_id} points at missing node {missing_node_id}")]
    BrokenGraph {
        edge_id: EdgeId,
        missing_node_id: NodeId,
    },
    #[error("algorithm {algorithm_id} failed validation: {}", summarize(.issues))]
    InvalidGraph {
        algorithm_id: AlgorithmId,
        issues: Vec<GraphIssue>,
    },
    #[error("start node {0} does not exist or is inactive")]
    StartNodeMissing(NodeId),
}

impl PlayerError {
    /// True for failures a caller can reasonably retry (transport problems).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlayerError::Load(LoadError::Source(SourceError::Transport(_)))
        )
    }
}

fn summarize(issues: &[GraphIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
