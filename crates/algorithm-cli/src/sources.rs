use std::path::PathBuf;
use std::sync::Arc;

use algorithm_core::core::{AlgorithmGraph, AlgorithmId};
use algorithm_core::source::{AlgorithmSource, FileSource, InMemorySource};
use algorithm_http::{HttpAlgorithmSource, HttpSourceConfig};
use anyhow::{Context as _, bail};

use crate::PlayArgs;

const DEMO_DOCUMENT: &str = include_str!("../../../demos/chest_pain.json");

/// Where `play` reads its algorithm from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Demo,
    File(PathBuf),
    Dir(PathBuf, AlgorithmId),
    Api {
        base_url: Option<String>,
        algorithm_id: AlgorithmId,
    },
}

impl Target {
    pub(crate) fn from_args(args: &PlayArgs) -> anyhow::Result<Self> {
        if args.demo {
            return Ok(Target::Demo);
        }
        if let Some(path) = &args.file {
            return Ok(Target::File(path.clone()));
        }
        let Some(id) = args.id else {
            bail!("nothing to play: pass --demo, --file PATH, --dir DIR --id N or --id N");
        };
        let algorithm_id = AlgorithmId(id);
        Ok(match &args.dir {
            Some(dir) => Target::Dir(dir.clone(), algorithm_id),
            None => Target::Api {
                base_url: args.api_url.clone(),
                algorithm_id,
            },
        })
    }

    /// Build the source and resolve which algorithm to load from it.
    pub(crate) async fn open(&self) -> anyhow::Result<(Arc<dyn AlgorithmSource>, AlgorithmId)> {
        match self {
            Target::Demo => {
                let graph = demo_graph()?;
                let id = graph.id;
                Ok((Arc::new(InMemorySource::new().with_graph(graph)), id))
            }
            Target::File(path) => {
                let graph = FileSource::read_document(path)
                    .await
                    .with_context(|| format!("could not read {}", path.display()))?;
                Ok((Arc::new(FileSource::document(path)), graph.id))
            }
            Target::Dir(dir, id) => Ok((Arc::new(FileSource::directory(dir)), *id)),
            Target::Api {
                base_url,
                algorithm_id,
            } => {
                let config = match base_url {
                    Some(url) => HttpSourceConfig::from_env_with_base_url(url.as_str()),
                    None => HttpSourceConfig::from_env(),
                }
                .context("algorithm API is not configured")?;
                tracing::debug!(base_url = %config.base_url, "using algorithm API");
                let source = HttpAlgorithmSource::new(config)?;
                Ok((Arc::new(source), *algorithm_id))
            }
        }
    }
}

pub(crate) fn demo_graph() -> anyhow::Result<AlgorithmGraph> {
    AlgorithmGraph::from_json_str(DEMO_DOCUMENT).context("bundled demo document is invalid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm_core::runtime::validate_graph;
    use clap::Parser as _;

    fn target(args: &[&str]) -> anyhow::Result<Target> {
        let mut argv = vec!["algoplayer", "play"];
        argv.extend_from_slice(args);
        let crate::Cli {
            command: crate::Command::Play(play),
        } = crate::Cli::try_parse_from(argv)?
        else {
            bail!("not a play command");
        };
        Target::from_args(&play)
    }

    #[test]
    fn args_select_target() {
        assert_eq!(target(&["--demo"]).unwrap(), Target::Demo);
        assert_eq!(
            target(&["--dir", "algos", "--id", "4"]).unwrap(),
            Target::Dir(PathBuf::from("algos"), AlgorithmId(4))
        );
        assert_eq!(
            target(&["--id", "4", "--api-url", "http://localhost:8000"]).unwrap(),
            Target::Api {
                base_url: Some("http://localhost:8000".into()),
                algorithm_id: AlgorithmId(4)
            }
        );
        assert!(target(&[]).is_err());
    }

    #[test]
    fn demo_document_is_playable() {
        let graph = demo_graph().unwrap();
        let report = validate_graph(&graph);
        assert!(!report.has_errors(), "{report:?}");
        assert!(report.warnings().next().is_none(), "{report:?}");
    }

    #[tokio::test]
    async fn file_target_uses_document_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("algo.json");
        std::fs::write(&path, DEMO_DOCUMENT).unwrap();
        let (_, id) = Target::File(path).open().await.unwrap();
        assert_eq!(id, demo_graph().unwrap().id);
    }
}
