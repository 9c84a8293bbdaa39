//! Script execution for codemender.
//!
//! Generated scripts are never executed in this process's address space:
//! the runner writes the body to a temporary file and spawns an interpreter
//! subprocess with piped stdout/stderr and a wall-clock timeout. The parent
//! process's stdio is untouched on every exit path, and the temporary file
//! is removed when the runner returns.

pub mod python;

pub use python::{PythonRunner, PythonRunnerConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of running one script.
///
/// A script fault (non-zero exit, interpreter traceback, timeout) is a
/// normal outcome carried in `error`, not an `Err`: failures are the
/// designed-for path of the retry loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Human-readable fault description; `None` iff the run succeeded.
    pub error: Option<String>,
    /// Captured stdout of the run; empty after a failed run.
    pub output: String,
}

impl RunOutput {
    /// Creates a successful outcome with the captured stdout.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            error: None,
            output: output.into(),
        }
    }

    /// Creates a failed outcome with a fault description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            output: String::new(),
        }
    }

    /// Returns true if the run succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Errors raised by the execution harness itself, as opposed to faults
/// inside the executed script.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Failed to stage script: {0}")]
    Staging(String),

    #[error("Interpreter '{interpreter}' could not be spawned: {reason}")]
    InterpreterUnavailable {
        interpreter: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for script runners that execute a script body with output capture.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Executes the given script body and returns the captured outcome.
    ///
    /// Implementations must catch every fault raised by the script and
    /// convert it into `RunOutput::failure`; `Err` is reserved for harness
    /// faults such as temp-file staging.
    async fn run(&self, code: &str) -> Result<RunOutput, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_output_success() {
        let out = RunOutput::success("4\n");
        assert!(out.is_success());
        assert_eq!(out.output, "4\n");
        assert!(out.error.is_none());
    }

    #[test]
    fn test_run_output_failure_clears_output() {
        let out = RunOutput::failure("NameError: name 'x' is not defined");
        assert!(!out.is_success());
        assert_eq!(out.output, "");
        assert!(out.error.as_deref().unwrap_or("").contains("NameError"));
    }

    #[test]
    fn test_run_output_serialization() {
        let out = RunOutput::success("hello");
        let json = serde_json::to_string(&out).expect("serialization should succeed");
        assert!(json.contains("\"error\":null"));
        assert!(json.contains("\"output\":\"hello\""));
    }
}
