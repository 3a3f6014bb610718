use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every food name that is missing a translation
    Run {
        /// Target languages (comma-separated)
        #[arg(short, long)]
        languages: Option<String>,

        /// Foods fetched per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Maximum in-flight translation requests
        #[arg(long)]
        concurrency: Option<usize>,

        /// Checkpoint file used to resume interrupted runs
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Ignore and delete any existing checkpoint before starting
        #[arg(long)]
        fresh: bool,

        /// Stop after this many foods (the checkpoint is kept)
        #[arg(long)]
        limit: Option<u64>,

        /// Translate without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Run the local translation proxy
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check the translation API and the data API
    Check,

    /// Translate a single string with the configured endpoint
    Translate {
        /// Text to translate
        text: String,

        /// Target language
        #[arg(short, long)]
        target: String,

        /// Source language (defaults to the configured one)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Inspect or clear the resume checkpoint
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show the saved checkpoint
    Show,

    /// Delete the saved checkpoint
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Output path
        #[arg(short, long, default_value = "cibus.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
