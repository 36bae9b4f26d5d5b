mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacer_scheduler::SchedulerConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pacer")]
#[command(about = "Bounded-concurrency task scheduler demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit simulated tasks to a bounded scheduler and report the results
    Demo {
        /// Maximum number of tasks running at once
        #[arg(long, env = "PACER_CAPACITY", default_value = "2", value_parser = parse_capacity)]
        capacity: SchedulerConfig,
        /// Number of tasks to submit
        #[arg(long, default_value_t = 4)]
        tasks: usize,
        /// How long each simulated task takes
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        /// Make the task with this number (1-based) fail
        #[arg(long)]
        fail: Option<usize>,
    },
    /// Validate a JSON scheduler config file
    Check {
        /// Path to the config file
        path: PathBuf,
    },
}

fn parse_capacity(raw: &str) -> Result<SchedulerConfig, String> {
    SchedulerConfig::from_str_capacity(raw).map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            capacity,
            tasks,
            delay_ms,
            fail,
        } => {
            let config = capacity.with_name("demo");
            let report = demo::run(config, tasks, delay_ms, fail).await?;
            println!(
                "{} tasks: {} succeeded, {} failed, peak concurrency {}",
                report.submitted, report.succeeded, report.failed, report.peak_running
            );
        }
        Commands::Check { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: SchedulerConfig = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.validate()?;
            println!(
                "{}: scheduler {:?} with capacity {}",
                path.display(),
                config.name,
                config.capacity
            );
        }
    }

    Ok(())
}
