//! The ingestion pipeline: length, open, read blocks, transform, write

use crate::error::PipelineError;
use crate::reader::BlockReader;
use block_ingest_file::{Filesystem, DEFAULT_BLOCK_SIZE};
use block_ingest_transform::Transform;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Input length in bytes, as queried before opening
    pub input_length: u64,
    pub blocks_read: u64,
    pub bytes_written: usize,
    pub duration: Duration,
}

impl RunReport {
    /// Input bytes read per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.input_length as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Reads one file block by block, transforms it, and writes the result.
///
/// Stages run strictly in order and the first failure ends the run:
///
/// 1. query the input length
/// 2. open the input
/// 3. read `length` bytes in `block_size` blocks
/// 4. apply the transform to the assembled buffer
/// 5. write the output file (created or replaced)
///
/// The input handle is dropped as soon as the read loop finishes, whether it
/// succeeded or not. Every run ends with exactly one completion log event.
pub struct Pipeline<F> {
    fs: F,
    block_size: usize,
    cancel: CancellationToken,
}

impl<F: Filesystem> Pipeline<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            block_size: DEFAULT_BLOCK_SIZE,
            cancel: CancellationToken::new(),
        }
    }

    /// Bytes requested per read. Zero is rejected when the pipeline runs.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Cancelling `token` stops the run before its next read, seek, or write
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the pipeline from `input` to `output`.
    pub async fn run<T>(
        &self,
        input: &Path,
        output: &Path,
        transform: &T,
    ) -> Result<RunReport, PipelineError>
    where
        T: Transform + ?Sized,
    {
        info!(
            "Processing {} -> {} (block size {}, transform {})",
            input.display(),
            output.display(),
            self.block_size,
            transform.name()
        );

        let result = self.execute(input, output, transform).await;

        match &result {
            Ok(report) => info!(
                "Wrote {} bytes to {} from {} blocks ({} bytes) in {:?}",
                report.bytes_written,
                output.display(),
                report.blocks_read,
                report.input_length,
                report.duration
            ),
            Err(e) if e.is_cancelled() => warn!("Pipeline cancelled: {e}"),
            Err(e) => {
                let stage = e.stage().map(|s| s.as_str()).unwrap_or("config");
                error!("Pipeline exited early at {stage} stage: {e}");
            }
        }

        result
    }

    async fn execute<T>(
        &self,
        input: &Path,
        output: &Path,
        transform: &T,
    ) -> Result<RunReport, PipelineError>
    where
        T: Transform + ?Sized,
    {
        let started = Instant::now();
        let reader = BlockReader::new(&self.fs, self.block_size)?
            .with_cancellation(self.cancel.clone());

        if self.cancel.is_cancelled() {
            return Err(self.cancelled(input, 0, 0));
        }

        let length = self
            .fs
            .length(input)
            .await
            .map_err(|source| PipelineError::LengthQueryFailed {
                path: input.to_path_buf(),
                source,
            })?;
        debug!("{}: length is {} bytes", input.display(), length);

        let mut handle =
            self.fs
                .open(input)
                .await
                .map_err(|source| PipelineError::OpenFailed {
                    path: input.to_path_buf(),
                    source,
                })?;
        debug!("{}: opened", input.display());

        let assembled = reader.read_all(&mut handle, input, length).await;
        drop(handle);
        let assembled = assembled?;

        let data = transform
            .apply(&assembled.data)
            .map_err(|source| PipelineError::TransformFailed {
                path: input.to_path_buf(),
                source,
            })?;
        debug!(
            "{}: transform {} produced {} bytes",
            input.display(),
            transform.name(),
            data.len()
        );

        if self.cancel.is_cancelled() {
            return Err(self.cancelled(input, length, length));
        }

        self.fs
            .write(output, &data)
            .await
            .map_err(|source| PipelineError::WriteFailed {
                path: output.to_path_buf(),
                source,
            })?;

        Ok(RunReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_length: length,
            blocks_read: assembled.blocks,
            bytes_written: data.len(),
            duration: started.elapsed(),
        })
    }

    fn cancelled(&self, input: &Path, cursor: u64, length: u64) -> PipelineError {
        PipelineError::Cancelled {
            path: input.to_path_buf(),
            cursor,
            length,
        }
    }
}
