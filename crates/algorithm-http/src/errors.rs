use thiserror::Error;

/// Failures building the HTTP source. Request failures are reported as
/// [`SourceError`](algorithm_core::errors::SourceError) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpSourceError {
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}
