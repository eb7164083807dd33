//! block-ingest Library
//!
//! Reads a file in fixed-size blocks, transforms the assembled contents, and
//! writes the result to a new file.
//!
//! # Features
//!
//! - Bounded reads: each read requests at most `block_size` bytes and the last
//!   one is clamped to the file length
//! - Explicit cursor: the reader seeks past every block it reads
//! - Short-circuiting stages: the first failure ends the run and names its stage
//! - Atomic output: the output file is replaced in one rename
//! - Cancellation between blocks via `tokio_util::sync::CancellationToken`
//!
//! # Workspace Crates
//!
//! - `block_ingest_file` - Filesystem capability (local and in-memory backends)
//! - `block_ingest_transform` - Buffer transforms (column sums, passthrough)
//!
//! # CLI Usage
//!
//! ```bash
//! # Sum the columns of vector_data.csv into vector_stats_out
//! block-ingest run
//!
//! # Explicit paths and a small block size
//! block-ingest run --input data.csv --output sums.csv --block-size 2
//!
//! # Settings from a YAML file, with a flag override
//! block-ingest run --config run.yaml --transform passthrough
//! ```
//!
//! # Library Usage
//!
//! ```ignore
//! use block_ingest::{run_file, transform::ColumnSum};
//!
//! let report = run_file("vector_data.csv", "vector_stats_out", 2, &ColumnSum::new()).await?;
//! println!("read {} blocks", report.blocks_read);
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;

use std::path::Path;

// Re-export workspace crates for convenience
pub use block_ingest_file as file;
pub use block_ingest_transform as transform;

pub use args::RunArgs;
pub use config::{ConfigError, RunConfig, TransformKind};
pub use error::{PipelineError, Stage};
pub use pipeline::{Pipeline, RunReport};
pub use reader::{AssembledBuffer, BlockReader};

use block_ingest_file::LocalFilesystem;
use block_ingest_transform::Transform;

/// Run the pipeline once against the local filesystem.
pub async fn run_file<T>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    block_size: usize,
    transform: &T,
) -> Result<RunReport, PipelineError>
where
    T: Transform + ?Sized,
{
    Pipeline::new(LocalFilesystem::new())
        .with_block_size(block_size)
        .run(input.as_ref(), output.as_ref(), transform)
        .await
}
