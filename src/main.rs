//! # Archive WebP Optimizer - Main Entry Point
//!
//! Parses the (deliberately tiny) command line, sets up logging, discovers
//! the archives to process and runs the batch loop. All tuning lives in
//! `Config::default()`; the CLI only selects what to process.
//!
//! ```bash
//! archive-optimizer              # every .zip in the current directory
//! archive-optimizer book.zip    # just this one
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use archive_webp_optimizer::file_manager::FileManager;
use archive_webp_optimizer::{Config, Cwebp, PipelineOrchestrator, SevenZip};

#[derive(Parser)]
#[command(name = "archive-optimizer")]
#[command(about = "Convert image archives to WebP when it actually saves space")]
struct Args {
    /// Archive to process (default: every .zip in the current directory)
    archive: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let invocation_dir = std::env::current_dir()?;
    let archives = FileManager::find_archives(&invocation_dir, args.archive.as_deref())?;

    if archives.is_empty() {
        eprintln!("No ZIP archives found in the current directory.");
        std::process::exit(1);
    }

    let engine = SevenZip::new();
    engine.check_available().await?;
    Cwebp::check_available().await?;

    let config = Config::default();
    info!(
        "processing {} archives (quality {}, {} workers)",
        archives.len(),
        config.webp_quality,
        config.effective_workers()
    );

    let encoder = Arc::new(Cwebp::new(&config));
    let mut orchestrator =
        PipelineOrchestrator::new(config, Arc::new(engine), encoder, &invocation_dir).await?;

    let stats = orchestrator.run(archives).await?;
    println!("{}", stats.format_summary());

    Ok(())
}
