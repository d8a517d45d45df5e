use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// SIFT credibility checker.
#[derive(Debug, Parser)]
#[command(name = "sift", version, about)]
pub struct Cli {
    /// YAML settings file; `sift.yaml` in the working directory is used when present.
    #[arg(long, global = true, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP service until Ctrl-C.
    Serve(ServeArgs),
    /// Analyze one claim and print the verdict.
    Check(CheckArgs),
    /// List the built-in sample claims.
    Samples,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// The suspicious information.
    #[arg(long)]
    pub content: String,
    /// Where it was seen.
    #[arg(long)]
    pub source: Option<String>,
    /// Print the raw JSON object instead of a report.
    #[arg(long)]
    pub json: bool,
}
