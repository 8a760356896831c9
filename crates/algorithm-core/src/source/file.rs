use std::path::{Path, PathBuf};

use tracing::debug;

use super::AlgorithmSource;
use crate::core::{AlgorithmGraph, AlgorithmId};
use crate::errors::SourceError;

#[derive(Debug, Clone)]
enum Location {
    /// `<dir>/<id>.json`
    Directory(PathBuf),
    /// One document, served for its own id only.
    Document(PathBuf),
}

/// Source reading algorithm documents from JSON files on disk.
/// Telemetry is a no-op.
#[derive(Debug, Clone)]
pub struct FileSource {
    location: Location,
}

impl FileSource {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Directory(dir.into()),
        }
    }

    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Document(path.into()),
        }
    }

    /// Read and decode one document file.
    pub async fn read_document(path: &Path) -> Result<AlgorithmGraph, SourceError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SourceError::Transport(format!("failed to read {}: {e}", path.display()))
        })?;
        AlgorithmGraph::from_json_str(&raw)
            .map_err(|e| SourceError::Decode(format!("{}: {e}", path.display())))
    }
}

#[async_trait::async_trait]
impl AlgorithmSource for FileSource {
    async fn fetch_complete_algorithm(
        &self,
        algorithm_id: AlgorithmId,
    ) -> Result<AlgorithmGraph, SourceError> {
        let path = match &self.location {
            Location::Directory(dir) => dir.join(format!("{algorithm_id}.json")),
            Location::Document(path) => path.clone(),
        };
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(SourceError::NotFound(algorithm_id));
        }
        debug!(%algorithm_id, path = %path.display(), "reading algorithm document");
        let graph = Self::read_document(&path).await?;
        if graph.id != algorithm_id {
            return Err(SourceError::NotFound(algorithm_id));
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "id": 3,
        "title": "Fever",
        "nodes": [
            {"id": 1, "uuid": "6f1d2c3b-4a59-4e8f-9d7c-1b2a3c4d5e01", "node_type": "start", "title": "Start"},
            {"id": 2, "uuid": "6f1d2c3b-4a59-4e8f-9d7c-1b2a3c4d5e02", "node_type": "end", "title": "End"}
        ],
        "edges": [
            {"id": 1, "uuid": "6f1d2c3b-4a59-4e8f-9d7c-1b2a3c4d5e10", "from_node_id": 1, "to_node_id": 2}
        ]
    }"#;

    #[tokio::test]
    async fn directory_source_reads_by_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("3.json"), DOC).unwrap();
        let source = FileSource::directory(dir.path());
        let graph = source.fetch_complete_algorithm(AlgorithmId(3)).await.unwrap();
        assert_eq!(graph.title, "Fever");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(
            source.fetch_complete_algorithm(AlgorithmId(4)).await.unwrap_err(),
            SourceError::NotFound(AlgorithmId(4))
        );
    }

    #[tokio::test]
    async fn document_source_only_serves_its_own_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fever.json");
        std::fs::write(&path, DOC).unwrap();
        let source = FileSource::document(&path);
        assert!(source.fetch_complete_algorithm(AlgorithmId(3)).await.is_ok());
        assert!(matches!(
            source.fetch_complete_algorithm(AlgorithmId(1)).await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn malformed_document_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("3.json"), "{\"id\": 3").unwrap();
        let source = FileSource::directory(dir.path());
        assert!(matches!(
            source.fetch_complete_algorithm(AlgorithmId(3)).await,
            Err(SourceError::Decode(_))
        ));
    }
}
