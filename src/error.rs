//! Error types for pipeline runs.

use block_ingest_transform::TransformError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Querying the input file length
    Length,
    /// Opening the input file
    Open,
    /// Reading a block
    Read,
    /// Advancing past a block
    Seek,
    /// Applying the transform to the assembled buffer
    Transform,
    /// Writing the output file
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Length => "length",
            Stage::Open => "open",
            Stage::Read => "read",
            Stage::Seek => "seek",
            Stage::Transform => "transform",
            Stage::Write => "write",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pipeline run stopped early.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Block size must be at least one byte.
    #[error("invalid block size {0}: must be greater than zero")]
    InvalidBlockSize(usize),

    #[error("{}: error getting file length: {source}", .path.display())]
    LengthQueryFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: error opening file: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: error reading {len} bytes at offset {offset}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("{}: error seeking {len} bytes from offset {offset}: {source}", .path.display())]
    SeekFailed {
        path: PathBuf,
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("{}: transform failed: {source}", .path.display())]
    TransformFailed {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("{}: error writing file: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The run was cancelled before the output was written.
    #[error("{}: cancelled after reading {cursor} of {length} bytes", .path.display())]
    Cancelled {
        path: PathBuf,
        cursor: u64,
        length: u64,
    },
}

impl PipelineError {
    /// The stage that failed, if the error came from one.
    ///
    /// Configuration errors and cancellation are not tied to a stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::InvalidBlockSize(_) | PipelineError::Cancelled { .. } => None,
            PipelineError::LengthQueryFailed { .. } => Some(Stage::Length),
            PipelineError::OpenFailed { .. } => Some(Stage::Open),
            PipelineError::ReadFailed { .. } => Some(Stage::Read),
            PipelineError::SeekFailed { .. } => Some(Stage::Seek),
            PipelineError::TransformFailed { .. } => Some(Stage::Transform),
            PipelineError::WriteFailed { .. } => Some(Stage::Write),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}
