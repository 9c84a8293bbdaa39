//! Tavily search API client.
//!
//! Tavily exposes a single `POST /search` endpoint taking the query and a
//! `max_results` cap, returning ranked results with extracted page content.
//! Queries must stay within the service's length constraints; callers are
//! expected to sanitize error text before searching (see
//! `agents::researcher`).

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Tavily search endpoint.
const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Configuration for search queries.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of results to return.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 1 }
    }
}

impl SearchConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Extracted page content snippet.
    pub content: String,
    /// Relevance score assigned by the service.
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    /// Renders the result as a single digest line.
    pub fn digest_line(&self) -> String {
        format!("{}: {} ({})", self.title, self.content, self.url)
    }
}

/// Renders a ranked result list into a single advisory digest string.
pub fn digest_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(SearchResult::digest_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for search providers that can look up error fixes.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a search query and returns ranked results.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Client for the Tavily search API.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    config: SearchConfig,
}

impl TavilyClient {
    /// Create a new client with the given API key and configuration.
    pub fn new(api_key: String, config: SearchConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            config,
        }
    }

    /// Create a new client with default configuration.
    pub fn with_defaults(api_key: String) -> Self {
        Self::new(api_key, SearchConfig::default())
    }

    /// Create a new client from the `TAVILY_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::MissingApiKey` if the variable is not set.
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = env::var("TAVILY_API_KEY").map_err(|_| SearchError::MissingApiKey)?;
        Ok(Self::with_defaults(api_key))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Internal request structure for the Tavily API.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

/// Internal response structure from the Tavily API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiResult>,
}

/// Internal result structure from the Tavily API.
#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let api_request = ApiRequest {
            api_key: &self.api_key,
            query,
            max_results: self.config.max_results,
        };

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                "Tavily search API returned error"
            );

            if status_code == 429 {
                return Err(SearchError::RateLimited(body));
            }

            return Err(SearchError::ApiError {
                code: status_code,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(format!("Failed to parse search response: {}", e)))?;

        let results = api_response
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
            })
            .collect();

        Ok(results)
    }
}
