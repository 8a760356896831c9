//! Where algorithm documents come from. The player only needs "fetch a graph
//! by id" plus two best-effort counters; the transport is up to the
//! implementation and is passed to the player explicitly.

mod file;
mod memory;

use crate::core::{AlgorithmGraph, AlgorithmId};
use crate::errors::SourceError;

pub use file::FileSource;
pub use memory::{Counters, InMemorySource};

#[async_trait::async_trait]
pub trait AlgorithmSource: Send + Sync {
    /// Fetch the complete document: metadata, nodes, edges and start node.
    async fn fetch_complete_algorithm(
        &self,
        algorithm_id: AlgorithmId,
    ) -> Result<AlgorithmGraph, SourceError>;

    /// Count one view of the algorithm. Called once per session after a successful load.
    async fn record_view(&self, _algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        Ok(())
    }

    /// Count one completed use of the algorithm.
    async fn record_usage(&self, _algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        Ok(())
    }
}
