//! Command-line argument parsing.

use clap::{Parser, Subcommand};

/// Demo runner for the `sgn` streaming dataflow runtime.
#[derive(Debug, Parser)]
#[command(name = "sgn", version, about, long_about = None)]
pub struct Cli {
    /// Which demo to build and run.
    #[command(subcommand)]
    pub command: Command,

    /// Logger level overrides, `<logger>:<level>[,<logger>:<level>...]`.
    ///
    /// Translated into `tracing-subscriber` `logger=level` directives and
    /// merged ahead of (taking precedence over) `RUST_LOG`.
    #[arg(long, env = "SGNLOGLEVEL", global = true)]
    pub log_level: Option<String>,

    /// Seconds to wait for subprocess workers to wind down, and for the
    /// whole run to observe an interrupt, before giving up.
    #[arg(long, default_value_t = 5)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and run one of the engine's seed scenarios to completion.
    Demo {
        #[command(subcommand)]
        scenario: DemoScenario,
    },
}

/// One of the end-to-end scenarios the engine's test suite seeds itself
/// with, exposed here so they can be watched run interactively.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum DemoScenario {
    /// `FakeSrc -> FakeTransform -> FakeSink`, a single linear chain.
    Simple,
    /// Two sources, four transforms, two sinks, with fan-out and fan-in.
    Graph,
    /// A transform and a sink offloaded to isolated worker threads.
    Subprocess,
}
