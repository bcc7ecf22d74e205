#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod cli;
mod demo;
mod shutdown;
mod telemetry;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sgn_subprocess::Supervisor;

use crate::cli::{Cli, Command, DemoScenario};

/// Tracing target for startup logging.
pub const TRACING_TARGET_STARTUP: &str = "sgn_cli::startup";
/// Tracing target for shutdown logging.
pub const TRACING_TARGET_SHUTDOWN: &str = "sgn_cli::shutdown";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_level.as_deref());

    let Err(error) = run(cli).await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "demo pipeline terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "demo pipeline terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let shutdown_timeout = Duration::from_secs(cli.shutdown_timeout);

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        "starting sgn demo runner"
    );

    let Command::Demo { scenario } = cli.command;

    // The subprocess scenario owns worker threads and a shared-memory
    // roster that must be torn down even if the pipeline future is dropped
    // mid-flight, so its supervisor is built here and reachable from the
    // shutdown arm below rather than hidden inside the scenario itself.
    let supervisor = matches!(scenario, DemoScenario::Subprocess)
        .then(|| Arc::new(Supervisor::new(shutdown_timeout)));

    tokio::select! {
        result = run_scenario(scenario, supervisor.clone()) => result,
        () = shutdown::shutdown_signal(shutdown_timeout) => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                "shutdown signal received before the pipeline reached end of stream"
            );
            if let Some(supervisor) = supervisor {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "forcing subprocess workers to stop and unlinking shared memory"
                );
                supervisor.shutdown_now();
            }
            Ok(())
        }
    }
}

/// Build and run the scenario named on the command line.
async fn run_scenario(scenario: DemoScenario, supervisor: Option<Arc<Supervisor>>) -> anyhow::Result<()> {
    match scenario {
        DemoScenario::Simple => demo::simple::run().await,
        DemoScenario::Graph => demo::graph::run().await,
        DemoScenario::Subprocess => {
            demo::subprocess::run(supervisor.expect("subprocess scenario always builds a supervisor")).await
        }
    }
}
