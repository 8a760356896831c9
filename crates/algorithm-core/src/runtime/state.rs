use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::condition::Response;
use crate::core::{EdgeId, NodeId};

/// Runtime state of one play-through. The current node is always the last
/// history entry and history is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlayerStateRecord")]
pub struct PlayerState {
    #[serde(skip_serializing)]
    start: NodeId,
    history: Vec<NodeId>,
    responses: HashMap<Uuid, Response>,
    completed: bool,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("player state history must contain at least the start node")]
pub struct EmptyHistory;

#[derive(Deserialize)]
struct PlayerStateRecord {
    history: Vec<NodeId>,
    #[serde(default)]
    responses: HashMap<Uuid, Response>,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<PlayerStateRecord> for PlayerState {
    type Error = EmptyHistory;

    fn try_from(r: PlayerStateRecord) -> Result<Self, Self::Error> {
        let start = *r.history.first().ok_or(EmptyHistory)?;
        Ok(Self {
            start,
            history: r.history,
            responses: r.responses,
            completed: r.completed,
        })
    }
}

impl PlayerState {
    pub(crate) fn new(start: NodeId) -> Self {
        Self {
            start,
            history: vec![start],
            responses: HashMap::new(),
            completed: false,
        }
    }

    pub fn current(&self) -> NodeId {
        self.history.last().copied().unwrap_or(self.start)
    }

    /// Visited nodes, earliest first.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// Responses keyed by node uuid; the latest answer at a node wins.
    pub fn responses(&self) -> &HashMap<Uuid, Response> {
        &self.responses
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn record(&mut self, node_uuid: Uuid, response: Response) {
        self.responses.insert(node_uuid, response);
    }

    pub(crate) fn advance(&mut self, to: NodeId, completes: bool) {
        self.history.push(to);
        self.completed = completes;
    }

    /// Step back one node. Returns false when already at the first node.
    pub(crate) fn pop(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        self.completed = false;
        true
    }

    pub(crate) fn reset(&mut self, start: NodeId) {
        *self = Self::new(start);
    }
}

/// Why a submitted response produced no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadEndReason {
    /// The node has no active outgoing edges and is not an end node.
    NoOutgoingEdges,
    /// Outgoing edges exist but none matched the response.
    NoMatchingEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadEnd {
    pub node_id: NodeId,
    pub reason: DeadEndReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    NotInitialized,
    AlreadyCompleted,
    /// `choose` was given an index outside the offered choices.
    NoSuchChoice,
}

/// Outcome of submitting a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Advanced {
        from: NodeId,
        to: NodeId,
        edge_id: EdgeId,
    },
    /// Moved onto an end node; the session is now completed.
    Completed {
        from: NodeId,
        to: NodeId,
        edge_id: EdgeId,
    },
    /// State unchanged apart from the recorded response.
    DeadEnd(DeadEnd),
    /// Nothing happened; no response was recorded.
    Ignored { reason: IgnoredReason },
}

impl Transition {
    pub fn moved(&self) -> bool {
        matches!(self, Transition::Advanced { .. } | Transition::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_tracks_last_history_entry() {
        let mut s = PlayerState::new(NodeId(1));
        assert_eq!(s.current(), NodeId(1));
        s.advance(NodeId(2), false);
        s.advance(NodeId(3), true);
        assert_eq!(s.current(), NodeId(3));
        assert_eq!(s.history(), &[NodeId(1), NodeId(2), NodeId(3)]);
        assert!(s.is_completed());
    }

    #[test]
    fn pop_keeps_first_entry_and_clears_completion() {
        let mut s = PlayerState::new(NodeId(1));
        assert!(!s.pop());
        s.advance(NodeId(4), true);
        assert!(s.pop());
        assert!(!s.is_completed());
        assert_eq!(s.history(), &[NodeId(1)]);
        assert!(!s.pop());
    }

    #[test]
    fn reset_clears_responses() {
        let mut s = PlayerState::new(NodeId(1));
        s.record(Uuid::new_v4(), Response::from("x"));
        s.advance(NodeId(2), false);
        s.reset(NodeId(1));
        assert_eq!(s, PlayerState::new(NodeId(1)));
    }

    #[test]
    fn serialized_state_reads_back() {
        let mut s = PlayerState::new(NodeId(1));
        s.record(Uuid::nil(), Response::from(true));
        s.advance(NodeId(2), true);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("start").is_none());
        let back: PlayerState = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.current(), NodeId(2));
    }

    #[test]
    fn state_without_history_is_rejected() {
        let err = serde_json::from_str::<PlayerState>(
            r#"{"history": [], "responses": {}, "completed": true}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least the start node"));

        let s: PlayerState = serde_json::from_str(r#"{"history": [5, 6]}"#).unwrap();
        assert_eq!(s.current(), NodeId(6));
        assert!(!s.is_completed());
    }

    #[test]
    fn later_response_overwrites() {
        let mut s = PlayerState::new(NodeId(1));
        let key = Uuid::new_v4();
        s.record(key, Response::from("first"));
        s.record(key, Response::from(true));
        assert_eq!(s.responses().get(&key), Some(&Response::Bool(true)));
        assert_eq!(s.responses().len(), 1);
    }
}
