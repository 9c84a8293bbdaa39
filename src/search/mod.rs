//! Web-search integration for codemender.
//!
//! The researcher agent uses a search service to turn a runtime error into
//! advisory notes for the next generation attempt. The [`SearchProvider`]
//! trait is the seam between the agent and the concrete Tavily client.

pub mod tavily;

pub use tavily::{SearchConfig, SearchProvider, SearchResult, TavilyClient};
