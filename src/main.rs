use std::path::PathBuf;

use catalog_sweeper::{
    catalog::HttpCatalogClient,
    config::SweeperConfig,
    observability::{init_tracing, metrics::init_metrics},
    sweep::{CleanupEngine, EnumerationLimits, Policy, start_cleanup_worker},
};
use clap::Parser;
use serde::Serialize;

const DEFAULT_CONFIG_PATH: &str = "catalog-sweeper.toml";

#[derive(Parser, Debug)]
#[command(version, about = "Delete expired, tag-marked items from a shop catalog", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run one cleanup pass and print the summary
    Cleanup,
    /// List the items a cleanup would delete, without deleting
    Scan,
    /// Print the first listed items, unfiltered
    Sample {
        /// Number of items to print
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Run cleanups on the configured interval until interrupted
    Worker,
    /// Validate the config file and exit
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match SweeperConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Command::CheckConfig = args.command {
        println!("Config OK: {}", args.config.display());
        return;
    }

    if let Err(e) = init_tracing(&config.observability.logging) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = init_metrics(&config.observability.metrics) {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::process::exit(1);
    }

    let client = match HttpCatalogClient::from_config(&config.catalog) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create catalog client");
            std::process::exit(1);
        }
    };
    let engine = CleanupEngine::new(client, EnumerationLimits::from(&config.catalog));
    let policy = Policy::from_config(&config.policy);

    match args.command {
        Command::Cleanup => print_or_exit(engine.cleanup(&policy).await),
        Command::Scan => print_or_exit(engine.diagnostics().scan(&policy).await),
        Command::Sample { count } => print_or_exit(engine.diagnostics().sample(count).await),
        Command::Worker => run_worker(engine, policy, config).await,
        Command::CheckConfig => {}
    }
}

/// Run the scheduled worker until Ctrl+C or SIGTERM.
async fn run_worker(
    engine: CleanupEngine<HttpCatalogClient>,
    policy: Policy,
    config: SweeperConfig,
) {
    if !config.worker.enabled {
        eprintln!("Error: the worker is disabled; set [worker] enabled = true");
        std::process::exit(1);
    }

    tokio::select! {
        _ = start_cleanup_worker(engine, policy, config.worker) => {},
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping cleanup worker");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_or_exit<T, E>(result: Result<T, E>)
where
    T: Serialize,
    E: std::fmt::Display,
{
    let value = match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            std::process::exit(1);
        }
    }
}
