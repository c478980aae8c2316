mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tcov_web::{run_web_server, WebState};
use tracing_subscriber::EnvFilter;

use crate::report::{check_config, compare_report, gaps_report, load_config};

const DEFAULT_CONFIG_PATH: &str = "tcov.toml";
const LOG_TARGETS: [&str; 4] = ["tcov_cli", "tcov_core", "tcov_source", "tcov_web"];

#[derive(Parser, Debug)]
#[command(
    name = "tcov",
    version,
    about = "Duplicate test case detection and requirement coverage gaps"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file. A missing file means built-in defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Compare new test cases against an existing repository.
    Compare {
        /// New test cases (.json, .jsonl or .toml).
        #[arg(long = "new")]
        new_cases: PathBuf,

        /// Existing test case repository.
        #[arg(long)]
        existing: PathBuf,

        /// Minimum similarity for a reported match; defaults to the configured value.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Report requirement coverage gaps.
    Gaps {
        #[arg(long)]
        requirements: PathBuf,

        #[arg(long = "test-cases")]
        test_cases: PathBuf,
    },

    /// Validate the engine configuration.
    CheckConfig,

    /// Serve the HTTP API.
    Serve {
        /// Listen address; overrides `[web] bind`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::new(
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(","),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compare {
            new_cases,
            existing,
            threshold,
        } => {
            let config = load_config(&cli.config)?;
            let report = compare_report(&config, &new_cases, &existing, threshold)?;
            emit(&report, cli.pretty)
        }
        Commands::Gaps {
            requirements,
            test_cases,
        } => {
            let report = gaps_report(&requirements, &test_cases);
            emit(&report, cli.pretty)
        }
        Commands::CheckConfig => {
            let report = check_config(&cli.config)?;
            emit(&report, cli.pretty)?;
            if !report.valid {
                bail!("config at {} has validation errors", cli.config.display());
            }
            Ok(())
        }
        Commands::Serve { bind } => {
            let config = load_config(&cli.config)?;
            let bind = bind.unwrap_or_else(|| config.web.bind.clone());
            let state = WebState::new(config)?;
            run_web_server(&bind, state)
                .await
                .with_context(|| format!("web server on {bind} failed"))
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}
