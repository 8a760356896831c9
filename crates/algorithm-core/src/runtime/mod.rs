mod choice;
mod graph;
mod state;
mod telemetry;
mod validate;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::condition::{Response, edge_matches};
use crate::config::{PlayerConfig, ValidationMode};
use crate::core::{AlgorithmGraph, AlgorithmId, AlgorithmNode, NodeId};
use crate::errors::{LoadError, PlayerError};
use crate::source::AlgorithmSource;
use telemetry::{Telemetry, TelemetryEvent};

pub use choice::{Choice, accepts_free_text, choices_for, decision_response, response_from_input};
pub use graph::{
    NodeIndex, StartError, explicit_start_id, outgoing_edges, predecessors, reachable_from,
    resolve_start, successors,
};
pub use state::{DeadEnd, DeadEndReason, EmptyHistory, IgnoredReason, PlayerState, Transition};
pub use validate::{GraphIssue, Severity, ValidationReport, validate_graph};

/// Lifecycle of an [`AlgorithmPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPhase {
    /// Nothing loaded yet.
    Idle,
    /// A fetch is in flight. Also left behind if an `initialize` future is dropped.
    Loading,
    Ready,
    Completed,
    /// The last `initialize` failed; see [`AlgorithmPlayer::last_error`].
    Failed,
}

/// Everything that belongs to one loaded algorithm.
struct Session {
    algorithm_id: AlgorithmId,
    graph: Arc<AlgorithmGraph>,
    index: NodeIndex,
    report: ValidationReport,
    state: PlayerState,
    usage_recorded: bool,
}

/// Interactive interpreter for one algorithm at a time: one sequential stream of
/// user actions, no internal locking. The source is injected so callers decide
/// the transport.
pub struct AlgorithmPlayer {
    source: Arc<dyn AlgorithmSource>,
    config: PlayerConfig,
    telemetry: Telemetry,
    session: Option<Session>,
    phase: PlayerPhase,
    last_error: Option<PlayerError>,
}

fn start_of(algorithm_id: AlgorithmId, graph: &AlgorithmGraph) -> Result<NodeId, PlayerError> {
    match resolve_start(graph) {
        Ok(node) => Ok(node.id),
        Err(StartError::NotFound(node_id)) => Err(PlayerError::StartNodeMissing(node_id)),
        Err(StartError::Empty) => Err(LoadError::EmptyGraph(algorithm_id).into()),
    }
}

impl AlgorithmPlayer {
    pub fn new(source: Arc<dyn AlgorithmSource>, config: PlayerConfig) -> Self {
        let telemetry = Telemetry::new(Arc::clone(&source), config.telemetry);
        Self {
            source,
            config,
            telemetry,
            session: None,
            phase: PlayerPhase::Idle,
            last_error: None,
        }
    }

    pub fn with_defaults(source: Arc<dyn AlgorithmSource>) -> Self {
        Self::new(source, PlayerConfig::default())
    }

    /// Fetch `algorithm_id` and start a fresh session at its start node.
    ///
    /// Any previous session is discarded first; on failure the player holds no
    /// session and the phase is [`PlayerPhase::Failed`]. A view is reported
    /// only on success.
    pub async fn initialize(
        &mut self,
        algorithm_id: impl Into<AlgorithmId>,
    ) -> Result<(), PlayerError> {
        let algorithm_id = algorithm_id.into();
        self.session = None;
        self.last_error = None;
        self.phase = PlayerPhase::Loading;
        debug!(%algorithm_id, "loading algorithm");

        match self.load(algorithm_id).await {
            Ok(session) => {
                info!(
                    %algorithm_id,
                    title = %session.graph.title,
                    start_node_id = %session.state.current(),
                    nodes = session.graph.nodes.len(),
                    edges = session.graph.edges.len(),
                    "algorithm ready"
                );
                self.session = Some(session);
                self.phase = PlayerPhase::Ready;
                self.telemetry.dispatch(TelemetryEvent::View, algorithm_id);
                Ok(())
            }
            Err(err) => {
                error!(%algorithm_id, error = %err, "failed to initialize algorithm");
                self.phase = PlayerPhase::Failed;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    async fn load(&self, algorithm_id: AlgorithmId) -> Result<Session, PlayerError> {
        let graph = self
            .source
            .fetch_complete_algorithm(algorithm_id)
            .await
            .map_err(LoadError::from)?;
        if !graph.nodes.iter().any(|n| n.is_active) {
            return Err(LoadError::EmptyGraph(algorithm_id).into());
        }

        let report = validate_graph(&graph);
        for issue in report.warnings() {
            warn!(%algorithm_id, %issue, "algorithm graph warning");
        }
        if report.has_errors() {
            if self.config.validation == ValidationMode::Strict {
                return Err(PlayerError::InvalidGraph {
                    algorithm_id,
                    issues: report.errors().cloned().collect(),
                });
            }
            for issue in report.errors() {
                warn!(%algorithm_id, %issue, "structural error ignored in lenient mode");
            }
        }

        let start = start_of(algorithm_id, &graph)?;
        let index = NodeIndex::build(&graph);
        Ok(Session {
            algorithm_id,
            graph: Arc::new(graph),
            index,
            report,
            state: PlayerState::new(start),
            usage_recorded: false,
        })
    }

    /// Record `response` at the current node and follow the first matching edge.
    ///
    /// Before `initialize` or after completion this is a no-op reported as
    /// [`Transition::Ignored`]. A dead end keeps the position but still keeps
    /// the response.
    pub fn submit_response(
        &mut self,
        response: impl Into<Response>,
    ) -> Result<Transition, PlayerError> {
        let response = response.into();
        let Some(session) = self.session.as_mut() else {
            debug!("response ignored: no algorithm loaded");
            return Ok(Transition::Ignored {
                reason: IgnoredReason::NotInitialized,
            });
        };
        if session.state.is_completed() {
            debug!(algorithm_id = %session.algorithm_id, "response ignored: already completed");
            return Ok(Transition::Ignored {
                reason: IgnoredReason::AlreadyCompleted,
            });
        }

        let graph = Arc::clone(&session.graph);
        let from = session.state.current();
        let Some(current) = session.index.get(&graph, from) else {
            error!(algorithm_id = %session.algorithm_id, node_id = %from, "current node missing from index");
            return Ok(Transition::Ignored {
                reason: IgnoredReason::NotInitialized,
            });
        };
        session.state.record(current.uuid, response.clone());

        let edges = outgoing_edges(&graph, from);
        if edges.is_empty() {
            info!(algorithm_id = %session.algorithm_id, node_id = %from, "dead end: no outgoing edges");
            return Ok(Transition::DeadEnd(DeadEnd {
                node_id: from,
                reason: DeadEndReason::NoOutgoingEdges,
            }));
        }
        let policy = self.config.unknown_conditions;
        let Some(edge) = edges
            .into_iter()
            .find(|edge| edge_matches(edge, &response, policy))
        else {
            info!(
                algorithm_id = %session.algorithm_id,
                node_id = %from,
                response = %response,
                "dead end: no edge matched"
            );
            return Ok(Transition::DeadEnd(DeadEnd {
                node_id: from,
                reason: DeadEndReason::NoMatchingEdge,
            }));
        };

        let Some(target) = session.index.get(&graph, edge.to_node_id) else {
            let err = PlayerError::BrokenGraph {
                edge_id: edge.id,
                missing_node_id: edge.to_node_id,
            };
            error!(algorithm_id = %session.algorithm_id, error = %err, "broken graph");
            self.last_error = Some(err.clone());
            return Err(err);
        };

        let completes = target.node_type.is_end();
        session.state.advance(target.id, completes);
        debug!(
            algorithm_id = %session.algorithm_id,
            from = %from,
            to = %target.id,
            edge_id = %edge.id,
            "transition"
        );
        if !completes {
            return Ok(Transition::Advanced {
                from,
                to: target.id,
                edge_id: edge.id,
            });
        }

        self.phase = PlayerPhase::Completed;
        info!(algorithm_id = %session.algorithm_id, node_id = %target.id, "algorithm completed");
        if !session.usage_recorded {
            session.usage_recorded = true;
            self.telemetry
                .dispatch(TelemetryEvent::Usage, session.algorithm_id);
        }
        Ok(Transition::Completed {
            from,
            to: target.id,
            edge_id: edge.id,
        })
    }

    /// Submit typed text at an input node, shaped by its input type.
    pub fn submit_input(&mut self, raw: &str) -> Result<Transition, PlayerError> {
        let response = match self.current_node() {
            Some(node) => response_from_input(node, raw),
            None => Response::from(raw),
        };
        self.submit_response(response)
    }

    /// Choices offered at the current node; empty when nothing is loaded.
    pub fn choices(&self) -> Vec<Choice> {
        match (self.graph(), self.current_node()) {
            (Some(graph), Some(node)) => choices_for(graph, node),
            _ => Vec::new(),
        }
    }

    /// Submit the response behind `choices()[index]`.
    pub fn choose(&mut self, index: usize) -> Result<Transition, PlayerError> {
        if self.session.is_none() {
            return Ok(Transition::Ignored {
                reason: IgnoredReason::NotInitialized,
            });
        }
        match self.choices().into_iter().nth(index) {
            Some(choice) => self.submit_response(choice.response),
            None => Ok(Transition::Ignored {
                reason: IgnoredReason::NoSuchChoice,
            }),
        }
    }

    /// Step back to the previous node. Returns false (and changes nothing) at
    /// the first node. Recorded responses are kept; nothing is re-reported.
    pub fn go_back(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.state.pop() {
            return false;
        }
        self.phase = PlayerPhase::Ready;
        debug!(
            algorithm_id = %session.algorithm_id,
            node_id = %session.state.current(),
            "went back"
        );
        true
    }

    /// Start over on the already loaded graph: no fetch, no telemetry.
    pub fn restart(&mut self) -> Result<(), PlayerError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let start = start_of(session.algorithm_id, &session.graph)?;
        session.state.reset(start);
        self.phase = PlayerPhase::Ready;
        debug!(algorithm_id = %session.algorithm_id, node_id = %start, "restarted");
        Ok(())
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn algorithm_id(&self) -> Option<AlgorithmId> {
        self.session.as_ref().map(|s| s.algorithm_id)
    }

    pub fn graph(&self) -> Option<&AlgorithmGraph> {
        self.session.as_ref().map(|s| s.graph.as_ref())
    }

    pub fn state(&self) -> Option<&PlayerState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn current_node(&self) -> Option<&AlgorithmNode> {
        let session = self.session.as_ref()?;
        session.index.get(&session.graph, session.state.current())
    }

    /// Visited node ids, earliest first. Empty before `initialize`.
    pub fn history(&self) -> &[NodeId] {
        self.state().map(PlayerState::history).unwrap_or(&[])
    }

    /// Visited nodes, earliest first.
    pub fn history_nodes(&self) -> Vec<&AlgorithmNode> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        session
            .state
            .history()
            .iter()
            .filter_map(|id| session.index.get(&session.graph, *id))
            .collect()
    }

    pub fn responses(&self) -> Option<&HashMap<Uuid, Response>> {
        self.state().map(PlayerState::responses)
    }

    /// Response recorded at `node_id`, if any.
    pub fn response_at(&self, node_id: NodeId) -> Option<&Response> {
        let session = self.session.as_ref()?;
        let node = session.index.get(&session.graph, node_id)?;
        session.state.responses().get(&node.uuid)
    }

    pub fn is_completed(&self) -> bool {
        self.state().is_some_and(PlayerState::is_completed)
    }

    /// Validation findings for the loaded graph.
    pub fn diagnostics(&self) -> Option<&ValidationReport> {
        self.session.as_ref().map(|s| &s.report)
    }

    /// Last failure from `initialize` or a broken edge during traversal.
    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    /// Wait until every telemetry call dispatched so far has finished.
    pub async fn flush_telemetry(&mut self) {
        self.telemetry.flush().await;
    }
}
