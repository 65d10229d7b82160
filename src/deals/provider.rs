use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::DealsConfig;
use crate::error::{MoguError, Result};

/// One result from the text-search provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

/// Text-search seam the deal finder queries for current promotions.
/// The production implementation talks to a JSON search endpoint; tests
/// substitute stubs.
#[async_trait]
pub trait TextSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
enum SearchBackend {
    Json {
        base_url: Url,
        client: reqwest::Client,
    },
    Unavailable {
        reason: String,
    },
}

/// Client for a SearXNG-style search endpoint (`?q=<query>&format=json`).
///
/// Construction never fails: a missing or malformed configuration yields an
/// unavailable client, and the deal service degrades to fallback entries
/// instead of refusing to start.
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    backend: SearchBackend,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawSearchResult>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResult {
    title: String,
    url: String,
}

impl SearchApiClient {
    pub fn new(config: &DealsConfig) -> Self {
        let Some(raw_url) = &config.search_base_url else {
            return Self::unavailable("DEALS_SEARCH_BASE_URL is not configured");
        };

        let base_url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                return Self::unavailable(&format!("invalid search base URL '{raw_url}': {e}"))
            }
        };

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => return Self::unavailable(&format!("failed to build HTTP client: {e}")),
        };

        Self {
            backend: SearchBackend::Json { base_url, client },
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: SearchBackend::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}

#[async_trait]
impl TextSearch for SearchApiClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let (base_url, client) = match &self.backend {
            SearchBackend::Json { base_url, client } => (base_url, client),
            SearchBackend::Unavailable { reason } => {
                return Err(MoguError::Provider(reason.clone()))
            }
        };

        let mut url = base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| MoguError::Provider(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MoguError::Provider(format!(
                "search endpoint returned {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| MoguError::Provider(format!("malformed search response: {e}")))?;

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                link: r.url,
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        !matches!(self.backend, SearchBackend::Unavailable { .. })
    }
}
