use anyhow::{Context, Result};
use clap::Parser;
use sift_common::observability::init_logging;
use sift_config::{DEFAULT_CONFIG_FILE, Settings, SiftConfigLoader};
use sift_server::{AppState, samples::SAMPLES};
use std::net::SocketAddr;

mod cli;
mod report;
mod wiring;

use cli::{CheckArgs, Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load settings (env wins over file)
    let loader = match &cli.config {
        Some(path) => SiftConfigLoader::new().with_file(path),
        None => SiftConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let settings = loader.load().context("failed to load settings")?;

    // 2) Logging from settings
    let log_path = init_logging(settings.logging.to_log_config("sift"))?;
    tracing::debug!(log_file = %log_path.display(), ?settings, "settings loaded");

    match cli.command {
        Commands::Serve(args) => serve(&settings, args).await,
        Commands::Check(args) => check(&settings, args).await,
        Commands::Samples => {
            for (i, sample) in SAMPLES.iter().enumerate() {
                println!("{}. {} [{}]\n   {}\n", i + 1, sample.title, sample.source, sample.content);
            }
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, args: ServeArgs) -> Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&settings.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid listen address: {bind}"))?;

    let analyzer = wiring::build_analyzer(settings)?;
    sift_server::run_server(AppState::new(analyzer), addr).await
}

async fn check(settings: &Settings, args: CheckArgs) -> Result<()> {
    let analyzer = wiring::build_analyzer(settings)?;
    let extraction = analyzer
        .analyze(Some(&args.content), args.source.as_deref())
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        print!("{}", report::text_report(&extraction));
    }
    Ok(())
}
