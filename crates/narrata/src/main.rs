//! narrata CLI binary.
//!
//! - Serve the HTTP API
//! - Render a text file to a video
//! - Render several text files as a batch

use clap::Parser;
use narrata::{
    NarrataConfig, ObservabilityConfig, init_observability_with_config, shutdown_observability,
};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_batch, handle_render, handle_serve};

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = NarrataConfig::load(cli.config.as_deref())?;

    let mut observability = ObservabilityConfig::from_logging("narrata", config.logging());
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    if cli.json_logs {
        observability = observability.with_json_logs(true);
    }
    init_observability_with_config(observability)?;

    let result = match cli.command {
        Commands::Serve { host, port } => handle_serve(&config, host, port).await,
        Commands::Render {
            text_file,
            output,
            title,
        } => handle_render(&config, &text_file, &output, title).await,
        Commands::Batch {
            text_files,
            concurrency,
            fail_fast,
        } => handle_batch(&config, &text_files, concurrency, fail_fast).await,
    };

    shutdown_observability();
    result?;
    Ok(())
}
