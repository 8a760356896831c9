use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use super::AlgorithmSource;
use crate::core::{AlgorithmGraph, AlgorithmId};
use crate::errors::SourceError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub views: u64,
    pub usages: u64,
}

/// Source backed by documents held in memory. Keeps its own view/usage
/// counters so offline sessions and tests can observe telemetry.
#[derive(Debug, Default)]
pub struct InMemorySource {
    graphs: HashMap<AlgorithmId, AlgorithmGraph>,
    counters: DashMap<AlgorithmId, Counters>,
    fail_fetch: Option<SourceError>,
    fail_telemetry: AtomicBool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(mut self, graph: AlgorithmGraph) -> Self {
        self.graphs.insert(graph.id, graph);
        self
    }

    /// Every fetch fails with `err`.
    pub fn failing_with(mut self, err: SourceError) -> Self {
        self.fail_fetch = Some(err);
        self
    }

    /// Make `record_view` / `record_usage` fail (counters are still not updated).
    pub fn set_telemetry_failing(&self, failing: bool) {
        self.fail_telemetry.store(failing, Ordering::SeqCst);
    }

    pub fn counters(&self, algorithm_id: AlgorithmId) -> Counters {
        self.counters
            .get(&algorithm_id)
            .map(|c| *c)
            .unwrap_or_default()
    }

    fn bump(&self, algorithm_id: AlgorithmId, f: impl FnOnce(&mut Counters)) -> Result<(), SourceError> {
        if self.fail_telemetry.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("telemetry endpoint unavailable".into()));
        }
        if !self.graphs.contains_key(&algorithm_id) {
            return Err(SourceError::NotFound(algorithm_id));
        }
        f(&mut self.counters.entry(algorithm_id).or_default());
        Ok(())
    }
}

#[async_trait::async_trait]
impl AlgorithmSource for InMemorySource {
    async fn fetch_complete_algorithm(
        &self,
        algorithm_id: AlgorithmId,
    ) -> Result<AlgorithmGraph, SourceError> {
        if let Some(err) = &self.fail_fetch {
            return Err(err.clone());
        }
        self.graphs
            .get(&algorithm_id)
            .cloned()
            .ok_or(SourceError::NotFound(algorithm_id))
    }

    async fn record_view(&self, algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        self.bump(algorithm_id, |c| c.views += 1)
    }

    async fn record_usage(&self, algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        self.bump(algorithm_id, |c| c.usages += 1)
    }
}
