//! Researcher agent: turns an execution fault into advisory notes.
//!
//! Research is advisory and must never abort the loop: every failure path
//! degrades to a static fallback string. The raw error text is sanitized
//! to its last line and a bounded length before querying, to stay within
//! the search service's query constraints.

use std::sync::Arc;

use crate::search::{tavily::digest_results, SearchProvider};

/// Fallback notes returned when the search service is unavailable.
const FALLBACK_NOTES: &str = "Check syntax and indentation carefully.";

/// Query prefix prepended to the sanitized error summary.
const QUERY_PREFIX: &str = "python fix error";

/// Configuration for the researcher agent.
#[derive(Debug, Clone)]
pub struct ResearcherConfig {
    /// Maximum length of the sanitized error summary, in characters.
    pub max_summary_chars: usize,
}

impl Default for ResearcherConfig {
    fn default() -> Self {
        Self {
            max_summary_chars: 120,
        }
    }
}

impl ResearcherConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the summary length bound.
    pub fn with_max_summary_chars(mut self, max_summary_chars: usize) -> Self {
        self.max_summary_chars = max_summary_chars.max(16);
        self
    }
}

/// Researcher agent that looks up fixes for execution faults.
pub struct ResearcherAgent {
    search_client: Arc<dyn SearchProvider>,
    config: ResearcherConfig,
}

impl std::fmt::Debug for ResearcherAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearcherAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResearcherAgent {
    /// Agent name constant.
    pub const AGENT_NAME: &'static str = "researcher";

    /// Creates a new researcher agent.
    pub fn new(search_client: Arc<dyn SearchProvider>, config: ResearcherConfig) -> Self {
        Self {
            search_client,
            config,
        }
    }

    /// Creates with default configuration.
    pub fn with_defaults(search_client: Arc<dyn SearchProvider>) -> Self {
        Self::new(search_client, ResearcherConfig::default())
    }

    /// Researches an execution fault and returns advisory notes.
    ///
    /// Never fails: search faults and empty result lists both degrade to a
    /// static fallback so the loop always continues.
    pub async fn research(&self, error_text: &str) -> String {
        let summary = self.summarize_error(error_text);
        let query = format!("{} {}", QUERY_PREFIX, summary);

        match self.search_client.search(&query).await {
            Ok(results) if !results.is_empty() => digest_results(&results),
            Ok(_) => {
                tracing::debug!(query = %query, "Search returned no results");
                FALLBACK_NOTES.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search failed, using fallback notes");
                FALLBACK_NOTES.to_string()
            }
        }
    }

    /// Reduces an error text to its last non-empty line, bounded in length.
    fn summarize_error(&self, error_text: &str) -> String {
        let last_line = error_text
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
            .trim();

        // Truncate on a char boundary
        last_line
            .chars()
            .take(self.config.max_summary_chars)
            .collect()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResearcherConfig {
        &self.config
    }
}
