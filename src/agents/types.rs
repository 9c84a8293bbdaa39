//! Shared types for the retry loop: the attempt session, terminal results
//! and progress events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The mutable record threaded through every step of one task submission.
///
/// The loop controller exclusively owns and mutates the session; agents
/// receive read views and return partial updates that the controller merges
/// field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSession {
    /// Session identifier for logs and events.
    pub id: Uuid,
    /// Immutable user-supplied goal, set once at session start.
    pub task: String,
    /// Most recently generated script body; overwritten each generation.
    pub code: String,
    /// Fault from the last execution; `None` iff the most recent run succeeded.
    pub error: Option<String>,
    /// Most recent research digest; empty until the first failure.
    pub research: String,
    /// Count of generation attempts so far; monotonically increasing.
    pub iterations: u32,
    /// Captured stdout of the last run.
    pub output: String,
}

impl AttemptSession {
    /// Creates a fresh session for the given task.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            code: String::new(),
            error: None,
            research: String::new(),
            iterations: 0,
            output: String::new(),
        }
    }

    /// The attempt number the next generation step will carry (1-based).
    pub fn next_attempt(&self) -> u32 {
        self.iterations + 1
    }
}

/// Terminal state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The last run produced no error.
    Success,
    /// The attempt budget is consumed and the error persists.
    Exhausted,
}

impl std::fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopOutcome::Success => write!(f, "success"),
            LoopOutcome::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Result reported to the caller when the loop terminates.
///
/// Exhaustion is a normal, reportable outcome carrying the last known
/// code/output/error; it is never surfaced as an error value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResult {
    /// Terminal state.
    pub outcome: LoopOutcome,
    /// Final attempt's script body.
    pub code: String,
    /// Captured stdout of the last run.
    pub output: String,
    /// Fault description of the last run; `None` on success.
    pub error: Option<String>,
    /// Total generation attempts consumed.
    pub iterations: u32,
}

impl FinalResult {
    /// Builds the final result from a terminated session.
    pub fn from_session(session: &AttemptSession) -> Self {
        let outcome = if session.error.is_none() {
            LoopOutcome::Success
        } else {
            LoopOutcome::Exhausted
        };

        Self {
            outcome,
            code: session.code.clone(),
            output: session.output.clone(),
            error: session.error.clone(),
            iterations: session.iterations,
        }
    }

    /// Returns true if the session ended in success.
    pub fn is_success(&self) -> bool {
        self.outcome == LoopOutcome::Success
    }
}

/// Nodes of the retry loop, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStage {
    /// Drafting a script from the task and prior context.
    Programmer,
    /// Executing the drafted script with output capture.
    Executor,
    /// Researching the execution fault.
    Researcher,
}

impl LoopStage {
    /// Human-readable stage name.
    pub fn display_name(&self) -> &'static str {
        match self {
            LoopStage::Programmer => "Programmer",
            LoopStage::Executor => "Executor",
            LoopStage::Researcher => "Researcher",
        }
    }
}

impl std::fmt::Display for LoopStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Progress events emitted once per node transition, for CLI and UI
/// consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    /// A node began work for the given attempt.
    NodeStarted {
        /// 1-based attempt number.
        attempt: u32,
        /// The node that started.
        stage: LoopStage,
        /// Short status message.
        message: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A node finished for the given attempt.
    NodeCompleted {
        /// 1-based attempt number.
        attempt: u32,
        /// The node that finished.
        stage: LoopStage,
        /// Short status message.
        message: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
    /// The session reached a terminal state.
    SessionCompleted {
        /// The reported result.
        result: FinalResult,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
    /// The session aborted on an unrecoverable fault.
    SessionFailed {
        /// Fault description.
        error: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LoopEvent {
    /// Creates a node-started event.
    pub fn node_started(attempt: u32, stage: LoopStage, message: impl Into<String>) -> Self {
        LoopEvent::NodeStarted {
            attempt,
            stage,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a node-completed event.
    pub fn node_completed(attempt: u32, stage: LoopStage, message: impl Into<String>) -> Self {
        LoopEvent::NodeCompleted {
            attempt,
            stage,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a session-completed event.
    pub fn session_completed(result: FinalResult) -> Self {
        LoopEvent::SessionCompleted {
            result,
            timestamp: Utc::now(),
        }
    }

    /// Creates a session-failed event.
    pub fn session_failed(error: impl Into<String>) -> Self {
        LoopEvent::SessionFailed {
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}
