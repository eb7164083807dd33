//! Command-line interface for block-ingest
//!
//! # Usage Examples
//!
//! ```bash
//! # Column sums of vector_data.csv, written to vector_stats_out
//! block-ingest run
//!
//! # Read 2 bytes at a time, with debug logging of every read and seek
//! RUST_LOG=block_ingest=debug block-ingest run --input vector_data.csv --block-size 2
//!
//! # Copy a file through the block reader
//! block-ingest run -i big.bin -o copy.bin --transform passthrough
//! ```

use anyhow::Context;
use block_ingest::file::LocalFilesystem;
use block_ingest::{Pipeline, RunArgs};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "block-ingest")]
#[command(about = "Read a file in fixed-size blocks, transform it, and write the result")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once from an input file to an output file
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => {
            let config = args.resolve().context("Invalid run configuration")?;
            let transform = config.build_transform()?;

            let pipeline = Pipeline::new(LocalFilesystem::new())
                .with_block_size(config.block_size)
                .with_cancellation(setup_shutdown_handler());

            let report = pipeline
                .run(&config.input, &config.output, transform.as_ref())
                .await
                .with_context(|| {
                    format!(
                        "Failed to process {} into {}",
                        config.input.display(),
                        config.output.display()
                    )
                })?;

            info!(
                "Done: {} bytes in {:?} ({:.0} bytes/sec)",
                report.input_length,
                report.duration,
                report.bytes_per_second()
            );
        }
    }

    Ok(())
}

/// Cancel the returned token on Ctrl+C
fn setup_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal (Ctrl+C)");
            cancel.cancel();
        }
    });

    token
}
