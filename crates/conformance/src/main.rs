//! Pulsecheck CLI entry point
//!
//! Runs the conformance suite against a backend and exits 0 only when every
//! case passed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pulsecheck::output::print_summary;
use pulsecheck::{ApiClient, ConformanceRunner, Context, Group, HarnessConfig};

#[derive(Parser, Debug)]
#[command(name = "pulsecheck")]
#[command(about = "RBAC conformance runner for the DataPulse API")]
#[command(version)]
struct Args {
    /// Backend origin (the /api prefix is appended)
    #[arg(long, env = "PULSECHECK_BASE_URL")]
    base_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "PULSECHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "PULSECHECK_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Run only these groups (repeatable); order is always the canonical one
    #[arg(short, long, value_enum)]
    group: Vec<Group>,

    /// Directory to write conformance-results.json into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log every request
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\nUnexpected error during testing: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<i32> {
    let config = load_config(&args)?;
    let client = ApiClient::from_config(&config).context("building HTTP client")?;

    let groups = if args.group.is_empty() {
        Group::ALL.to_vec()
    } else {
        args.group.clone()
    };
    let mut runner = ConformanceRunner::with_groups(Context::new(client, config), &groups);

    let outcome = runner
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler: never interrupt
                std::future::pending::<()>().await;
            }
        })
        .await;

    // Before the results write, which may fail
    print_summary(outcome.summary(), outcome.is_interrupted());

    if let Some(dir) = &args.output {
        runner
            .context()
            .log
            .write_json(dir)
            .context("writing results")?;
    }

    Ok(outcome.exit_code())
}
