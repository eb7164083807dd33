//! Block-wise reading of an open file into one buffer

use crate::error::PipelineError;
use block_ingest_file::Filesystem;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The bytes of a file, assembled from consecutive blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBuffer {
    pub data: Vec<u8>,
    /// Number of blocks read to assemble `data`
    pub blocks: u64,
}

/// Loop state carried from one block to the next
struct ReadState {
    cursor: u64,
    buffer: Vec<u8>,
    blocks: u64,
}

/// Blocks reserved up front; the buffer grows past this as reads arrive
const INITIAL_BLOCKS: u64 = 16;

impl ReadState {
    fn new(length: u64, block_size: usize) -> Self {
        let reserve = length.min((block_size as u64).saturating_mul(INITIAL_BLOCKS));
        Self {
            cursor: 0,
            buffer: Vec::with_capacity(usize::try_from(reserve).unwrap_or(0)),
            blocks: 0,
        }
    }
}

/// Reads a file of known length in fixed-size blocks.
///
/// Each iteration reads `min(block_size, length - cursor)` bytes at the
/// handle's position, appends them, then seeks the handle forward by the same
/// amount. The loop ends when the cursor reaches `length`, so the final block
/// is clamped and nothing past `length` is ever read.
pub struct BlockReader<'a, F: Filesystem> {
    fs: &'a F,
    block_size: usize,
    cancel: Option<CancellationToken>,
}

impl<'a, F: Filesystem> BlockReader<'a, F> {
    /// Create a reader; a zero `block_size` is rejected.
    pub fn new(fs: &'a F, block_size: usize) -> Result<Self, PipelineError> {
        if block_size == 0 {
            return Err(PipelineError::InvalidBlockSize(block_size));
        }
        Ok(Self {
            fs,
            block_size,
            cancel: None,
        })
    }

    /// Stop before the next read or seek once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Read `length` bytes from `handle`, starting at its current position.
    ///
    /// `path` is only used to describe failures. On error the partially
    /// assembled buffer is dropped.
    pub async fn read_all(
        &self,
        handle: &mut F::Handle,
        path: &Path,
        length: u64,
    ) -> Result<AssembledBuffer, PipelineError> {
        let mut state = ReadState::new(length, self.block_size);

        while state.cursor < length {
            // Bounded by block_size, so the cast back to usize is lossless
            let chunk = (self.block_size as u64).min(length - state.cursor) as usize;

            self.check_cancelled(path, &state, length)?;
            let block = self
                .fs
                .read(handle, chunk)
                .await
                .map_err(|source| PipelineError::ReadFailed {
                    path: path.to_path_buf(),
                    offset: state.cursor,
                    len: chunk,
                    source,
                })?;
            if block.len() != chunk {
                return Err(PipelineError::ReadFailed {
                    path: path.to_path_buf(),
                    offset: state.cursor,
                    len: chunk,
                    source: std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("short read: got {} bytes", block.len()),
                    ),
                });
            }
            state.buffer.extend_from_slice(&block);
            debug!(
                "{}: read {} bytes at offset {}",
                path.display(),
                chunk,
                state.cursor
            );

            self.check_cancelled(path, &state, length)?;
            self.fs
                .seek(handle, chunk as u64)
                .await
                .map_err(|source| PipelineError::SeekFailed {
                    path: path.to_path_buf(),
                    offset: state.cursor,
                    len: chunk,
                    source,
                })?;
            state.cursor += chunk as u64;
            state.blocks += 1;
            debug!("{}: seeked to offset {}", path.display(), state.cursor);
        }

        Ok(AssembledBuffer {
            data: state.buffer,
            blocks: state.blocks,
        })
    }

    fn check_cancelled(
        &self,
        path: &Path,
        state: &ReadState,
        length: u64,
    ) -> Result<(), PipelineError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(PipelineError::Cancelled {
                path: path.to_path_buf(),
                cursor: state.cursor,
                length,
            }),
            _ => Ok(()),
        }
    }
}
