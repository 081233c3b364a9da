//! modelbench - multi-run LLM benchmark runner and result aggregator.
//!
//! Runs a fixed test suite against a set of models behind a
//! bedrock-runtime-style HTTP endpoint, persists one JSON document per run,
//! and aggregates the run files into rankings and per-test statistics.

mod aggregate;
mod catalog;
mod config;
mod errors;
mod providers;
mod record;
mod suite;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::loader::{get_config_path, load_config, save_config, try_load_config};
use crate::providers::invoker::HttpInvoker;
use crate::record::RunSet;
use crate::suite::SuiteRunner;

pub(crate) const VERSION: &str = "0.1.0";

#[derive(Parser)]
#[command(name = "modelbench", about = "modelbench - LLM benchmark runner", version = VERSION)]
struct Cli {
    /// Path to the config file (default: ~/.modelbench/config.json).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Execute the benchmark suite for one or more runs.
    Run {
        /// 1-based index of a single run to execute. Executes all
        /// configured runs when omitted.
        #[arg(short, long)]
        run: Option<u32>,
    },
    /// Aggregate persisted run files into a combined report.
    Aggregate {
        /// Output path for the aggregated JSON report.
        #[arg(short, long, default_value = "aggregated_results.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Suppress noisy HTTP crates regardless of RUST_LOG setting.
    let noisy_crate_filters = ",hyper=warn,reqwest=warn";
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(_) => {
            let combined = format!(
                "{}{}",
                std::env::var("RUST_LOG").unwrap_or_default(),
                noisy_crate_filters
            );
            tracing_subscriber::EnvFilter::new(combined)
        }
        Err(_) => tracing_subscriber::EnvFilter::new(format!("warn{}", noisy_crate_filters)),
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => cmd_init(cli.config.as_deref(), force),
        Commands::Run { run } => cmd_run(cli.config.as_deref(), run).await,
        Commands::Aggregate { output } => cmd_aggregate(cli.config.as_deref(), &output),
    }
}

fn cmd_init(config_path: Option<&std::path::Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);
    if !force {
        match try_load_config(&path) {
            Ok(Some(_)) => bail!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            ),
            Ok(None) => {}
            // An unparsable existing file is reported, not overwritten.
            Err(e) => bail!("{} (use --force to overwrite)", e),
        }
    }
    let config = config::schema::Config::default();
    save_config(&config, Some(&path))?;
    println!("Wrote default config to {}", path.display());
    println!("Set endpoint.apiKey before running the suite.");
    Ok(())
}

async fn cmd_run(config_path: Option<&std::path::Path>, run: Option<u32>) -> Result<()> {
    let config = load_config(config_path);
    if config.endpoint.api_key.is_empty() {
        bail!("No API key configured (endpoint.apiKey). Run `modelbench init` and edit the config.");
    }

    let invoker = Arc::new(HttpInvoker::new(
        &config.endpoint.base_url,
        &config.endpoint.api_key,
    ));
    let runner = SuiteRunner::new(config.clone(), invoker);

    let runs: Vec<u32> = match run {
        Some(i) => {
            if i == 0 || i > config.num_runs {
                bail!("Run index {} out of range 1..={}", i, config.num_runs);
            }
            vec![i]
        }
        None => (1..=config.num_runs).collect(),
    };

    for i in runs {
        println!("\n{}", "#".repeat(70));
        println!("# RUN {}/{}", i, config.num_runs);
        println!("{}", "#".repeat(70));
        let path = runner.run(i).await?;
        println!("\nRun {} results saved to {}", i, path.display());
    }
    Ok(())
}

fn cmd_aggregate(config_path: Option<&std::path::Path>, output: &PathBuf) -> Result<()> {
    let config = load_config(config_path);
    let set = RunSet::load(&config)?;

    let report = aggregate::report::assemble(&set, &config);
    let json = report
        .to_json()
        .context("Failed to serialize aggregated report")?;
    fs::write(output, &json).map_err(|e| errors::AggregateError::ReportWrite {
        path: output.clone(),
        source: e,
    })?;

    println!("{}", aggregate::report::render(&report, &config));
    println!("\nAggregated report saved to {}", output.display());
    Ok(())
}
