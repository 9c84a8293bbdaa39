//! CLI command definitions for codemender.
//!
//! `run` drives one task submission from the terminal, printing per-node
//! progress and the final console-output / generated-code panes. `serve`
//! starts the browser front end.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use crate::agents::{
    LoopConfig, LoopController, LoopEvent, ProgrammerAgent, ProgrammerConfig, ResearcherAgent,
    ResearcherConfig,
};
use crate::config::AppConfig;
use crate::execution::{PythonRunner, PythonRunnerConfig};
use crate::llm::GroqClient;
use crate::search::{SearchConfig, TavilyClient};
use crate::server;

/// Attempt-budget bounds exposed to users (mirrored by the UI slider).
const MIN_ATTEMPTS: u32 = 1;
const MAX_ATTEMPTS: u32 = 5;

/// Self-correcting script agent: drafts, executes and repairs Python
/// scripts until they run.
#[derive(Parser)]
#[command(name = "codemender")]
#[command(about = "Draft, execute and repair Python scripts until they run")]
#[command(version)]
#[command(
    long_about = "codemender drafts a Python script for a natural-language task, executes it, and on failure researches the error and retries up to a bounded number of attempts.\n\nExample usage:\n  codemender run --task \"Get the price of Bitcoin in USD from the CoinGecko API and print it.\""
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run one task submission through the retry loop.
    Run(RunArgs),

    /// Start the browser front end.
    Serve(ServeArgs),
}

/// Arguments for `codemender run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Natural-language description of what the script should do.
    #[arg(short, long)]
    pub task: String,

    /// Maximum generate/execute attempts (1-5).
    #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(MIN_ATTEMPTS as i64..=MAX_ATTEMPTS as i64))]
    pub max_attempts: u32,

    /// Model identifier override.
    #[arg(long)]
    pub model: Option<String>,

    /// Interpreter used to execute drafted scripts.
    #[arg(long, default_value = "python3")]
    pub interpreter: String,

    /// Per-run script timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Emit the final result as JSON instead of the text panes.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `codemender serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind the server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "3001")]
    pub port: u16,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the CLI with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Configuration faults are fatal before any session starts.
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Run(args) => run_task(&config, args).await,
        Commands::Serve(args) => server::serve(config, &args.bind, args.port).await,
    }
}

/// Builds the loop controller from configuration.
pub fn build_controller(config: &AppConfig, args: &RunArgs) -> LoopController {
    let model = args.model.clone().unwrap_or_else(|| config.model.clone());

    let llm_client = Arc::new(GroqClient::new(
        config.api_base.clone(),
        config.groq_api_key.clone(),
        model,
    ));
    let search_client = Arc::new(TavilyClient::new(
        config.tavily_api_key.clone(),
        SearchConfig::default(),
    ));
    let runner = Arc::new(PythonRunner::new(
        PythonRunnerConfig::new()
            .with_interpreter(&args.interpreter)
            .with_timeout(std::time::Duration::from_secs(args.timeout_secs)),
    ));

    LoopController::new(
        ProgrammerAgent::new(llm_client, ProgrammerConfig::default()),
        runner,
        ResearcherAgent::new(search_client, ResearcherConfig::default()),
        LoopConfig::new().with_max_attempts(args.max_attempts),
    )
}

/// Drives one task submission and prints the outcome.
async fn run_task(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let controller = build_controller(config, &args);
    let max_attempts = args.max_attempts;

    info!(task = %args.task, max_attempts, "Submitting task");

    let (event_tx, mut event_rx) = mpsc::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let result = controller.run(&args.task, max_attempts, event_tx).await?;
    let _ = printer.await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("=== Final results ({}) ===", result.outcome);
    println!();
    println!("--- Console output ---");
    if result.output.is_empty() {
        println!("(no output)");
    } else {
        println!("{}", result.output.trim_end());
    }
    if let Some(error) = &result.error {
        println!();
        println!("--- Last error ---");
        println!("{}", error);
    }
    println!();
    println!("--- Generated code ---");
    println!("{}", result.code);

    Ok(())
}

/// Prints one progress event as a status line.
fn print_event(event: &LoopEvent) {
    match event {
        LoopEvent::NodeStarted {
            attempt,
            stage,
            message,
            ..
        } => {
            println!("[attempt {}] {}: {}", attempt, stage, message);
        }
        LoopEvent::NodeCompleted { stage, message, .. } => {
            println!("           {} -> {}", stage, message);
        }
        LoopEvent::SessionCompleted { result, .. } => {
            println!(
                "Session finished: {} after {} attempt(s)",
                result.outcome, result.iterations
            );
        }
        LoopEvent::SessionFailed { error, .. } => {
            eprintln!("Session aborted: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "codemender",
            "run",
            "--task",
            "print 2+2",
            "--max-attempts",
            "5",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.task, "print 2+2");
                assert_eq!(args.max_attempts, 5);
                assert_eq!(args.interpreter, "python3");
                assert!(!args.json);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_attempts() {
        let result = Cli::try_parse_from([
            "codemender",
            "run",
            "--task",
            "t",
            "--max-attempts",
            "9",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "codemender",
            "run",
            "--task",
            "t",
            "--max-attempts",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::try_parse_from(["codemender", "serve", "--port", "8080"])
            .expect("should parse");

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind, "127.0.0.1");
                assert_eq!(args.port, 8080);
            }
            _ => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_default_log_level() {
        let cli =
            Cli::try_parse_from(["codemender", "run", "--task", "t"]).expect("should parse");
        assert_eq!(cli.log_level, "warn");
    }
}
