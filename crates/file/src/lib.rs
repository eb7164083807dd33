//! Filesystem capability for block-ingest
//!
//! The pipeline never touches `std::fs` or `tokio::fs` directly. It talks to a
//! [`Filesystem`], which exposes exactly the five operations a block-wise
//! ingestion needs: query a length, open a handle, read from a handle, seek a
//! handle forward, and write a whole file.
//!
//! # Backends
//!
//! - **Local**: [`LocalFilesystem`], backed by `tokio::fs`. Output files are
//!   written atomically (temp file in the destination directory, then rename).
//! - **Memory**: [`MemoryFilesystem`], an in-process map of paths to bytes with
//!   call counters and fault injection, used to exercise failure paths.
//!
//! # Example
//!
//! ```ignore
//! use block_ingest_file::{Filesystem, LocalFilesystem};
//!
//! let fs = LocalFilesystem::new();
//! let length = fs.length(path).await?;
//! let mut handle = fs.open(path).await?;
//! let first = fs.read(&mut handle, 16).await?;
//! fs.seek(&mut handle, first.len() as u64).await?;
//! ```

mod local;
mod memory;

use async_trait::async_trait;
use std::io;
use std::path::Path;

pub use local::{LocalFilesystem, LocalHandle};
pub use memory::{Fault, MemoryFilesystem, MemoryHandle, OpCounts};

/// Default block size for reading operations (64KB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// The filesystem operations consumed by the ingestion pipeline.
///
/// Reads happen at the handle's current position and do not move it. Only
/// [`Filesystem::seek`] advances the position.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// An open file. Dropping the handle releases it.
    type Handle: Send;

    /// Size of the file at `path` in bytes. Does not require the file to be open.
    async fn length(&self, path: &Path) -> io::Result<u64>;

    /// Open the file at `path` for reading, positioned at offset 0.
    async fn open(&self, path: &Path) -> io::Result<Self::Handle>;

    /// Read exactly `len` bytes at the handle's current position.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if fewer bytes are available.
    async fn read(&self, handle: &mut Self::Handle, len: usize) -> io::Result<Vec<u8>>;

    /// Move the handle's position forward by `offset` bytes.
    async fn seek(&self, handle: &mut Self::Handle, offset: u64) -> io::Result<()>;

    /// Create or replace the file at `path` with `data`.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}
