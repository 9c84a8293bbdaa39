//! Programmer agent: drafts script bodies from the task and prior context.
//!
//! The agent asks the completion service for raw Python, strips any fencing
//! the model wraps the reply in anyway, and refuses to return an empty body.
//! Transport and parse faults are retried a bounded number of times before
//! surfacing; this retry budget is internal and separate from the loop's
//! `max_attempts`.

use std::sync::Arc;

use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::{build_programmer_prompt, PROGRAMMER_SYSTEM};
use crate::utils::code_extraction::{try_extract_code_from_response, CodeExtractionResult};

use super::error::{AgentError, AgentResult};

/// Internal retry budget for completion-service faults.
const GENERATION_RETRIES: u32 = 3;

/// Configuration for the programmer agent.
#[derive(Debug, Clone)]
pub struct ProgrammerConfig {
    /// Temperature for LLM generation; 0.0 for deterministic-leaning drafts.
    pub temperature: f64,
    /// Maximum tokens for the response.
    pub max_tokens: u32,
}

impl Default for ProgrammerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 4000,
        }
    }
}

impl ProgrammerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Sets the max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Programmer agent that drafts executable script bodies.
pub struct ProgrammerAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: ProgrammerConfig,
}

impl std::fmt::Debug for ProgrammerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgrammerAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProgrammerAgent {
    /// Agent name constant.
    pub const AGENT_NAME: &'static str = "programmer";

    /// Creates a new programmer agent.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: ProgrammerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, ProgrammerConfig::default())
    }

    /// Drafts a script body for the task, informed by the previous error
    /// and research notes (both empty on the first attempt).
    ///
    /// The returned value is a plain executable body: fencing is stripped
    /// and explanatory prose rejected via the empty-body check.
    pub async fn generate(
        &self,
        task: &str,
        previous_error: &str,
        research_notes: &str,
    ) -> AgentResult<String> {
        let mut last_error = None;
        for attempt in 0..GENERATION_RETRIES {
            match self.attempt_generate(task, previous_error, research_notes).await {
                Ok(code) => return Ok(code),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Script generation failed, retrying..."
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.expect("should have an error after failed attempts"))
    }

    /// Attempts a single generation.
    async fn attempt_generate(
        &self,
        task: &str,
        previous_error: &str,
        research_notes: &str,
    ) -> AgentResult<String> {
        let prompt = build_programmer_prompt(task, previous_error, research_notes);

        let request = GenerationRequest::new(
            "",
            vec![Message::system(PROGRAMMER_SYSTEM), Message::user(prompt)],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = self.llm_client.generate(request).await?;

        let content = response
            .first_content()
            .ok_or_else(|| AgentError::ResponseParseError("Empty LLM response".to_string()))?;

        match try_extract_code_from_response(content) {
            CodeExtractionResult::Success(code) => Ok(code),
            CodeExtractionResult::Empty => Err(AgentError::GenerationFailed(
                "Response contained no script body".to_string(),
            )),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ProgrammerConfig {
        &self.config
    }
}
