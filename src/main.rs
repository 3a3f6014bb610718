//! Cibus - Bulk food-name translation
//!
//! Entry point: parses the command line, sets up logging and configuration,
//! and dispatches to the bulk pipeline, the proxy server, or one of the
//! maintenance commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use cibus::checkpoint::CheckpointFile;
use cibus::cli::{Args, Commands, ConfigAction, ProgressAction};
use cibus::config::{Config, parse_languages};
use cibus::error::CibusError;
use cibus::pipeline::{Pipeline, PipelineOptions, RunStatus};
use cibus::progress::format_duration;
use cibus::server;
use cibus::store::{RestStore, TranslationStore};
use cibus::translate::{RetryPolicy, RetryingTranslator, TranslationOutcome, Translator, TranslatorFactory};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("cibus.toml").exists() {
                info!("Found cibus.toml in current directory, loading...");
                Config::from_file("cibus.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env();

    match args.command {
        Commands::Run { languages, page_size, concurrency, checkpoint, fresh, limit, dry_run, no_progress } => {
            if let Some(languages) = languages {
                config.pipeline.languages = parse_languages(&languages);
            }
            if let Some(page_size) = page_size {
                config.pipeline.page_size = page_size;
            }
            if let Some(concurrency) = concurrency {
                config.pipeline.max_concurrent_translations = concurrency;
            }
            if let Some(checkpoint) = checkpoint {
                config.pipeline.checkpoint_path = checkpoint.display().to_string();
            }
            config.validate()?;

            if fresh && CheckpointFile::new(&config.pipeline.checkpoint_path).remove().await? {
                info!("Starting fresh; previous checkpoint discarded");
            }

            let translator: Arc<dyn Translator> = Arc::new(TranslatorFactory::create_libre(
                &config.translate.endpoint,
                Duration::from_secs(config.translate.timeout_secs),
            )?);
            let store: Arc<dyn TranslationStore> = Arc::new(RestStore::new(&config.database)?);

            let pipeline = Pipeline::new(&config, translator, store);
            let mut options = PipelineOptions::from_config(&config);
            options.dry_run = dry_run;
            options.limit_foods = limit;
            options.show_progress = !no_progress;

            let summary = pipeline.with_options(options).run().await?;
            if summary.status == RunStatus::Interrupted {
                return Err(CibusError::Interrupted.into());
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.proxy.host = host;
            }
            if let Some(port) = port {
                config.proxy.port = port;
            }
            server::serve(&config.proxy).await?;
        }
        Commands::Check => {
            let translator = TranslatorFactory::create_libre(
                &config.translate.endpoint,
                Duration::from_secs(config.translate.timeout_secs),
            )?;
            match translator.health_check().await {
                Ok(()) => println!("Translation API: OK ({})", translator.base_url()),
                Err(e) => println!("Translation API: FAILED ({})", e),
            }

            if config.database.api_key.trim().is_empty() {
                println!("Data API: SKIPPED (no API key configured)");
            } else {
                let store = RestStore::new(&config.database)?;
                match store.count_foods().await {
                    Ok(Some(total)) => println!("Data API: OK ({} foods)", total),
                    Ok(None) => println!("Data API: OK (total unknown)"),
                    Err(e) => println!("Data API: FAILED ({})", e),
                }
            }
        }
        Commands::Translate { text, target, source } => {
            let source = source.unwrap_or_else(|| config.translate.source_language.clone());
            let translator: Arc<dyn Translator> = Arc::new(TranslatorFactory::create_libre(
                &config.translate.endpoint,
                Duration::from_secs(config.translate.timeout_secs),
            )?);
            let translator = RetryingTranslator::new(translator, RetryPolicy::from_config(&config.translate));

            match translator.translate_text(&text, &source, &target).await {
                TranslationOutcome::Translated(translation) => println!("{}", translation),
                TranslationOutcome::Unchanged => {
                    warn!("Translation is identical to the source text");
                    println!("{}", text);
                }
                TranslationOutcome::Exhausted { error, .. } => {
                    return Err(CibusError::Translation(error).into());
                }
            }
        }
        Commands::Progress { action } => {
            let file = CheckpointFile::new(&config.pipeline.checkpoint_path);
            match action {
                ProgressAction::Show => match file.load().await {
                    Some(checkpoint) => {
                        println!("\nCheckpoint: {}", file.path().display());
                        println!("{:<22} {}", "Foods processed:", checkpoint.processed_foods);
                        println!("{:<22} {}", "Translated:", checkpoint.translated_count);
                        println!("{:<22} {}", "Skipped:", checkpoint.skipped_count);
                        println!("{:<22} {}", "Failed:", checkpoint.failed_count);
                        println!(
                            "{:<22} {}",
                            "Compute time:",
                            format_duration(checkpoint.total_compute_time as u64)
                        );
                        if let Some(started) = checkpoint.started_at() {
                            println!("{:<22} {}", "Started:", started.format("%Y-%m-%d %H:%M:%S"));
                        }
                        if let Some(last_update) = &checkpoint.last_update {
                            println!("{:<22} {}", "Last update:", last_update);
                        }
                    }
                    None => println!("No checkpoint found at {}", file.path().display()),
                },
                ProgressAction::Clear => {
                    if file.remove().await? {
                        println!("Cleared checkpoint {}", file.path().display());
                    } else {
                        println!("No checkpoint found at {}", file.path().display());
                    }
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { output, force } => {
                if output.exists() && !force {
                    return Err(CibusError::Config(format!(
                        "{} already exists; use --force to overwrite",
                        output.display()
                    ))
                    .into());
                }
                Config::default().save_to_file(&output)?;
                println!("Wrote default configuration to {}", output.display());
            }
        },
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".cibus").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "cibus.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber.try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("cibus.log").display());

    Ok(())
}
