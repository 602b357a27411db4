use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogConfig};
use crate::demo::{countdown, sum_program, SumPlan};
use crate::interpreter::ForkJoinInterpreter;
use crate::observer::{Observer, RecordingObserver, TracingObserver};
use crate::spawner::{SpawnerHost, SpawnerKind};

#[derive(Parser, Debug)]
#[command(name = "forkjoin")]
#[command(about = "forkjoin - Describe fork/join computations as data and interpret them", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Execution context for forked fibers (overrides config file and env vars)
    #[arg(long, global = true, value_enum)]
    pub spawner: Option<SpawnerKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fork two computations, await both and print their sum
    Demo {
        /// Value produced by the first fiber
        #[arg(long, default_value = "2", allow_negative_numbers = true)]
        left: i64,

        /// Value produced by the second fiber
        #[arg(long, default_value = "4", allow_negative_numbers = true)]
        right: i64,

        /// Milliseconds the first fiber sleeps before producing its value
        #[arg(long, default_value = "0")]
        left_delay_ms: u64,

        /// Milliseconds the second fiber sleeps before producing its value
        #[arg(long, default_value = "0")]
        right_delay_ms: u64,

        /// Also print the recorded interpreter observations as JSON
        #[arg(long)]
        trace: bool,
    },

    /// Run a long sequential program (constant stack depth)
    Chain {
        /// Number of sequential steps
        #[arg(long, default_value = "1000000")]
        steps: u64,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

/// Internal function that handles CLI commands
fn run_cli_with_args(cli: Cli) -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Load and validate configuration before executing any command
    let config = Config::builder()
        .config_path(cli.config)
        .spawner(cli.spawner)
        .build()
        .context("Failed to load configuration")?;

    init_tracing(&config.log);
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Demo {
            left,
            right,
            left_delay_ms,
            right_delay_ms,
            trace,
        } => {
            let host =
                SpawnerHost::from_config(&config.runtime).context("Failed to build spawner")?;
            let recorder = Arc::new(RecordingObserver::new());

            let mut interpreter = ForkJoinInterpreter::new(host.spawner());
            if trace {
                let logging: Arc<dyn Observer> = Arc::new(TracingObserver);
                let recording: Arc<dyn Observer> = recorder.clone();
                let observers: Vec<Arc<dyn Observer>> = vec![logging, recording];
                interpreter = interpreter.with_observer(Arc::new(observers));
            }

            let program = sum_program(SumPlan {
                left,
                right,
                left_delay: Duration::from_millis(left_delay_ms),
                right_delay: Duration::from_millis(right_delay_ms),
            });
            let sum = interpreter.interpret(&program);

            println!("Result: {}", sum);

            if trace {
                let json = serde_json::to_string_pretty(&recorder.records())
                    .context("Failed to serialize trace")?;
                println!("{}", json);
            }
        }

        Commands::Chain { steps } => {
            let host =
                SpawnerHost::from_config(&config.runtime).context("Failed to build spawner")?;
            let interpreter = ForkJoinInterpreter::new(host.spawner());

            let done = interpreter.interpret(&countdown(steps));
            println!("Completed {} steps", done);
        }

        Commands::Config => {
            let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
            print!("{}", rendered);
        }
    }

    Ok(())
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Installing twice
/// is a no-op.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
