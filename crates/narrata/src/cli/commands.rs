//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// narrata - turn narrative text into a narrated video
#[derive(Parser, Debug)]
#[command(name = "narrata")]
#[command(about = "Turn narrative text into a narrated video", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the discovered ones
    #[arg(long, global = true, env = "NARRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Interface to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Render one text file to a video
    Render {
        /// Narrative text file
        text_file: PathBuf,

        /// Where to write the video
        #[arg(short, long, default_value = "out.mp4")]
        output: PathBuf,

        /// Project title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Render several text files as one batch
    Batch {
        /// Narrative text files
        #[arg(required = true)]
        text_files: Vec<PathBuf>,

        /// Pipelines allowed at once (defaults to the configuration)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Stop the batch at the first failure
        #[arg(long)]
        fail_fast: bool,
    },
}
