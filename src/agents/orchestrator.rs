//! Loop controller for the bounded generate/execute/diagnose cycle.
//!
//! The controller exclusively owns the attempt session, merges the partial
//! updates returned by each node, and decides termination:
//!
//! 1. Programmer drafts a script (consuming one attempt).
//! 2. Executor runs it with output capture.
//! 3. Success stops the loop; a failure with attempts remaining goes
//!    through the researcher and back to the programmer; an exhausted
//!    budget stops with the last error.
//!
//! Exhaustion is a normal `Ok(FinalResult)`; only unrecoverable generation
//! faults surface as `Err`. Repeated identical failures are deliberately
//! not short-circuited, so the loop spends its whole budget on a
//! persistent error.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::execution::ScriptRunner;

use super::error::AgentResult;
use super::programmer::ProgrammerAgent;
use super::researcher::ResearcherAgent;
use super::types::{AttemptSession, FinalResult, LoopEvent, LoopStage};

/// Default attempt budget, matching the UI slider's midpoint.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for the loop controller.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Number of generate/execute cycles to allow before giving up.
    pub max_attempts: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl LoopConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt budget (at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Controller that drives one task submission through the retry loop.
pub struct LoopController {
    programmer: ProgrammerAgent,
    runner: Arc<dyn ScriptRunner>,
    researcher: ResearcherAgent,
    config: LoopConfig,
}

impl std::fmt::Debug for LoopController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LoopController {
    /// Assembles a controller with default node configurations from the
    /// process configuration.
    pub fn from_app_config(config: &crate::config::AppConfig, loop_config: LoopConfig) -> Self {
        let llm_client = Arc::new(crate::llm::GroqClient::new(
            config.api_base.clone(),
            config.groq_api_key.clone(),
            config.model.clone(),
        ));
        let search_client = Arc::new(crate::search::TavilyClient::with_defaults(
            config.tavily_api_key.clone(),
        ));
        let runner = Arc::new(crate::execution::PythonRunner::with_defaults());

        Self::new(
            ProgrammerAgent::with_defaults(llm_client),
            runner,
            ResearcherAgent::with_defaults(search_client),
            loop_config,
        )
    }

    /// Creates a new controller from its three nodes.
    pub fn new(
        programmer: ProgrammerAgent,
        runner: Arc<dyn ScriptRunner>,
        researcher: ResearcherAgent,
        config: LoopConfig,
    ) -> Self {
        Self {
            programmer,
            runner,
            researcher,
            config,
        }
    }

    /// Runs the loop for a task, overriding the configured attempt budget.
    ///
    /// Progress events are delivered on `event_tx`, one per node
    /// transition; a dropped receiver never aborts the loop.
    pub async fn run(
        &self,
        task: &str,
        max_attempts: u32,
        event_tx: mpsc::Sender<LoopEvent>,
    ) -> AgentResult<FinalResult> {
        let max_attempts = max_attempts.max(1);
        let mut session = AttemptSession::new(task);

        info!(
            session_id = %session.id,
            max_attempts,
            "Starting session"
        );

        loop {
            let attempt = session.next_attempt();

            // Programmer node
            self.send_event(
                &event_tx,
                LoopEvent::node_started(
                    attempt,
                    LoopStage::Programmer,
                    format!("Drafting script (attempt {})", attempt),
                ),
            )
            .await;

            let generated = match self
                .programmer
                .generate(
                    &session.task,
                    session.error.as_deref().unwrap_or(""),
                    &session.research,
                )
                .await
            {
                Ok(code) => code,
                Err(e) => {
                    self.send_event(&event_tx, LoopEvent::session_failed(e.to_string()))
                        .await;
                    return Err(e);
                }
            };

            session.code = generated;
            session.iterations += 1;

            self.send_event(
                &event_tx,
                LoopEvent::node_completed(
                    attempt,
                    LoopStage::Programmer,
                    format!("Drafted {} lines", session.code.lines().count()),
                ),
            )
            .await;

            // Executor node
            self.send_event(
                &event_tx,
                LoopEvent::node_started(attempt, LoopStage::Executor, "Running script"),
            )
            .await;

            match self.runner.run(&session.code).await {
                Ok(run) => {
                    session.error = run.error;
                    session.output = run.output;
                }
                Err(e) => {
                    // Harness faults become session errors so the loop can
                    // still research and retry them.
                    session.error = Some(e.to_string());
                    session.output.clear();
                }
            }

            let status = match &session.error {
                None => "Success".to_string(),
                Some(error) => format!("Failed: {}", first_line(error)),
            };
            self.send_event(
                &event_tx,
                LoopEvent::node_completed(attempt, LoopStage::Executor, status),
            )
            .await;

            // Termination predicate
            if session.error.is_none() {
                info!(session_id = %session.id, iterations = session.iterations, "Session succeeded");
                let result = FinalResult::from_session(&session);
                self.send_event(&event_tx, LoopEvent::session_completed(result.clone()))
                    .await;
                return Ok(result);
            }

            if session.iterations >= max_attempts {
                info!(
                    session_id = %session.id,
                    iterations = session.iterations,
                    "Attempt budget exhausted"
                );
                let result = FinalResult::from_session(&session);
                self.send_event(&event_tx, LoopEvent::session_completed(result.clone()))
                    .await;
                return Ok(result);
            }

            // Researcher node
            self.send_event(
                &event_tx,
                LoopEvent::node_started(attempt, LoopStage::Researcher, "Investigating the fix"),
            )
            .await;

            let error_text = session
                .error
                .clone()
                .expect("error is present on the retry path");
            session.research = self.researcher.research(&error_text).await;

            self.send_event(
                &event_tx,
                LoopEvent::node_completed(attempt, LoopStage::Researcher, "Notes collected"),
            )
            .await;
        }
    }

    /// Runs the loop without progress events.
    ///
    /// This is the minimal core surface: `submit(task, max_attempts)`
    /// returning the final result.
    pub async fn submit(&self, task: &str, max_attempts: u32) -> AgentResult<FinalResult> {
        let (event_tx, mut event_rx) = mpsc::channel(32);
        // Drain events so the loop never waits on a full channel.
        let drain = tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
        let result = self.run(task, max_attempts, event_tx).await;
        let _ = drain.await;
        result
    }

    /// Runs the loop with the configured attempt budget.
    pub async fn run_with_defaults(
        &self,
        task: &str,
        event_tx: mpsc::Sender<LoopEvent>,
    ) -> AgentResult<FinalResult> {
        self.run(task, self.config.max_attempts, event_tx).await
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Sends an event, tolerating a dropped receiver.
    async fn send_event(&self, event_tx: &mpsc::Sender<LoopEvent>, event: LoopEvent) {
        if event_tx.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped; continuing without progress updates");
        }
    }
}

/// First line of a possibly multi-line error description.
fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
