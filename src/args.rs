use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Distributed database benchmark agent and report pipeline - renders backend launch plans, aggregates client latency logs into CSV reports, and inspects on-disk data sizes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug-level logging
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the launch plan for one cluster member without starting it
    Render(RenderArgs),
    /// Aggregate client latency logs into the report artifacts
    Aggregate(AggregateArgs),
    /// Report the total on-disk size of a database data directory
    Datasize(DatasizeArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Benchmark profile (TOML)
    #[arg(long = "config", env = "DBBENCH_CONFIG")]
    pub config: PathBuf,

    /// Which cluster member to render (1-based, matching the peer list)
    #[arg(long = "ordinal", default_value_t = 1)]
    pub ordinal: u32,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Benchmark profile (TOML)
    #[arg(long = "config", env = "DBBENCH_CONFIG")]
    pub config: PathBuf,

    /// Client latency sample logs, one per load generator
    #[arg(required = true)]
    pub samples: Vec<PathBuf>,

    /// Directory receiving the report artifacts
    #[arg(long = "output-dir", default_value = "report")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct DatasizeArgs {
    /// Database data directory to measure
    pub dir: PathBuf,
}
