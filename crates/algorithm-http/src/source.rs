use algorithm_core::core::{AlgorithmGraph, AlgorithmId};
use algorithm_core::errors::SourceError;
use algorithm_core::source::AlgorithmSource;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::HttpSourceConfig;
use crate::errors::HttpSourceError;

/// Source reading algorithms from the REST API.
///
/// - document: `GET {base}/algorithms/{id}/full`
/// - view: `GET {base}/algorithms/{id}` (the server counts metadata reads as views)
/// - usage: `POST {base}/algorithms/{id}/usage`
pub struct HttpAlgorithmSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpAlgorithmSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, HttpSourceError> {
        if config.base_url.trim().is_empty() {
            return Err(HttpSourceError::Config(
                "algorithm API base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| HttpSourceError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Creates a source from `ALGOPLAYER_API_*` environment variables.
    pub fn from_env() -> Result<Self, HttpSourceError> {
        Self::new(HttpSourceConfig::from_env()?)
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send `req` and return the body of a successful response.
    async fn send(
        &self,
        algorithm_id: AlgorithmId,
        req: reqwest::RequestBuilder,
    ) -> Result<String, SourceError> {
        let response = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("algorithm API request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        check_status(algorithm_id, status, &body)?;
        Ok(body)
    }
}

/// Map an HTTP status to the source error taxonomy. 404 is `NotFound`; any
/// other non-success status is a transport failure.
pub(crate) fn check_status(
    algorithm_id: AlgorithmId,
    status: StatusCode,
    body: &str,
) -> Result<(), SourceError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(algorithm_id));
    }
    Err(SourceError::Transport(format!(
        "algorithm API responded with status {status}: {}",
        truncate(body, 200)
    )))
}

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

pub(crate) fn decode_document(
    algorithm_id: AlgorithmId,
    body: &str,
) -> Result<AlgorithmGraph, SourceError> {
    let graph = AlgorithmGraph::from_json_str(body)
        .map_err(|e| SourceError::Decode(format!("algorithm {algorithm_id}: {e}")))?;
    if graph.id != algorithm_id {
        warn!(
            requested = %algorithm_id,
            returned = %graph.id,
            "algorithm API returned a different id"
        );
    }
    Ok(graph)
}

#[async_trait::async_trait]
impl AlgorithmSource for HttpAlgorithmSource {
    async fn fetch_complete_algorithm(
        &self,
        algorithm_id: AlgorithmId,
    ) -> Result<AlgorithmGraph, SourceError> {
        let url = self.config.full_algorithm_url(algorithm_id);
        debug!(%algorithm_id, %url, "fetching algorithm document");
        let body = self.send(algorithm_id, self.client.get(&url)).await?;
        decode_document(algorithm_id, &body)
    }

    async fn record_view(&self, algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        let url = self.config.algorithm_url(algorithm_id);
        self.send(algorithm_id, self.client.get(&url)).await?;
        Ok(())
    }

    async fn record_usage(&self, algorithm_id: AlgorithmId) -> Result<(), SourceError> {
        let url = self.config.usage_url(algorithm_id);
        self.send(algorithm_id, self.client.post(&url)).await?;
        Ok(())
    }
}
