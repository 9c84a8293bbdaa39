//! Python subprocess runner.

use std::io::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{ExecutionError, RunOutput, ScriptRunner};

/// Maximum number of stderr lines folded into a fault description.
const STDERR_TAIL_LINES: usize = 8;

/// Configuration for the Python runner.
#[derive(Debug, Clone)]
pub struct PythonRunnerConfig {
    /// Interpreter binary to spawn.
    pub interpreter: String,
    /// Wall-clock limit for one run.
    pub timeout: Duration,
}

impl Default for PythonRunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PythonRunnerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interpreter binary.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Sets the wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs script bodies with `python3` in a captured subprocess.
#[derive(Debug)]
pub struct PythonRunner {
    config: PythonRunnerConfig,
}

impl PythonRunner {
    /// Creates a new runner with the given configuration.
    pub fn new(config: PythonRunnerConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PythonRunnerConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PythonRunnerConfig {
        &self.config
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl ScriptRunner for PythonRunner {
    async fn run(&self, code: &str) -> Result<RunOutput, ExecutionError> {
        // The temp file is removed when `script` drops, on every exit path.
        let mut script = NamedTempFile::with_suffix(".py")
            .map_err(|e| ExecutionError::Staging(format!("Failed to create temp file: {}", e)))?;
        script
            .write_all(code.as_bytes())
            .map_err(|e| ExecutionError::Staging(format!("Failed to write script: {}", e)))?;
        script
            .flush()
            .map_err(|e| ExecutionError::Staging(format!("Failed to flush script: {}", e)))?;

        let start = Instant::now();

        let child = tokio::process::Command::new(&self.config.interpreter)
            .arg(script.path())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.config.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ExecutionError::InterpreterUnavailable {
                    interpreter: self.config.interpreter.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Script timed out"
                );
                return Ok(RunOutput::failure(format!(
                    "Script timed out after {} seconds",
                    self.config.timeout.as_secs()
                )));
            }
        };

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            debug!(duration_ms = duration.as_millis() as u64, "Script succeeded");
            Ok(RunOutput::success(stdout))
        } else {
            let description = summarize_failure(output.status.code(), &stderr);
            debug!(
                duration_ms = duration.as_millis() as u64,
                error = %description,
                "Script failed"
            );
            Ok(RunOutput::failure(description))
        }
    }
}

/// Folds an exit code and stderr tail into a human-readable description.
fn summarize_failure(exit_code: Option<i32>, stderr: &str) -> String {
    let tail: Vec<&str> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let tail_start = tail.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = tail[tail_start..].join("\n");

    match (exit_code, tail.is_empty()) {
        (_, false) => tail,
        (Some(code), true) => format!("Script exited with code {}", code),
        (None, true) => "Script terminated by signal".to_string(),
    }
}
