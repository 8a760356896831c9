use std::time::Duration;

use algorithm_core::core::AlgorithmId;

use crate::errors::HttpSourceError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the algorithm REST API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// API root, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Sent as `Authorization: Bearer ...` when present.
    pub bearer_token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("algoplayer/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Builds a config from `ALGOPLAYER_API_BASE_URL`, with optional
    /// `ALGOPLAYER_API_TOKEN` and `ALGOPLAYER_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, HttpSourceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with the base URL given explicitly,
    /// e.g. from a command line flag.
    pub fn from_env_with_base_url(base_url: impl Into<String>) -> Result<Self, HttpSourceError> {
        let base_url = base_url.into();
        Self::from_lookup(|key| match key {
            "ALGOPLAYER_API_BASE_URL" => Some(base_url.clone()),
            _ => std::env::var(key).ok(),
        })
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, HttpSourceError> {
        let base_url = lookup("ALGOPLAYER_API_BASE_URL").unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(HttpSourceError::Config(
                "missing ALGOPLAYER_API_BASE_URL for the algorithm API".into(),
            ));
        }
        let mut config = Self::new(base_url.trim());
        if let Some(token) = lookup("ALGOPLAYER_API_TOKEN").filter(|t| !t.trim().is_empty()) {
            config = config.bearer_token(token.trim());
        }
        if let Some(raw) = lookup("ALGOPLAYER_API_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                HttpSourceError::Config(format!("invalid ALGOPLAYER_API_TIMEOUT_SECS '{raw}'"))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn algorithm_url(&self, algorithm_id: AlgorithmId) -> String {
        format!("{}/algorithms/{algorithm_id}", self.root())
    }

    pub(crate) fn full_algorithm_url(&self, algorithm_id: AlgorithmId) -> String {
        format!("{}/full", self.algorithm_url(algorithm_id))
    }

    pub(crate) fn usage_url(&self, algorithm_id: AlgorithmId) -> String {
        format!("{}/usage", self.algorithm_url(algorithm_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let config = HttpSourceConfig::new("http://localhost:8000/api/");
        assert_eq!(config.algorithm_url(AlgorithmId(4)), "http://localhost:8000/api/algorithms/4");
        assert_eq!(
            config.full_algorithm_url(AlgorithmId(4)),
            "http://localhost:8000/api/algorithms/4/full"
        );
        assert_eq!(config.usage_url(AlgorithmId(4)), "http://localhost:8000/api/algorithms/4/usage");
    }

    #[test]
    fn from_env_requires_base_url() {
        let err = HttpSourceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, HttpSourceError::Config(_)));
        let err = HttpSourceConfig::from_lookup(lookup(&[("ALGOPLAYER_API_BASE_URL", "  ")]))
            .unwrap_err();
        assert!(matches!(err, HttpSourceError::Config(_)));
    }

    #[test]
    fn from_env_reads_token_and_timeout() {
        let config = HttpSourceConfig::from_lookup(lookup(&[
            ("ALGOPLAYER_API_BASE_URL", "https://algo.example/api"),
            ("ALGOPLAYER_API_TOKEN", "secret"),
            ("ALGOPLAYER_API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://algo.example/api");
        assert_eq!(config.bearer_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = HttpSourceConfig::from_lookup(lookup(&[
            ("ALGOPLAYER_API_BASE_URL", "https://algo.example/api"),
            ("ALGOPLAYER_API_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ALGOPLAYER_API_TIMEOUT_SECS"));
    }
}
