//! Local filesystem backend

use crate::Filesystem;
use async_trait::async_trait;
use std::io::{self, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Reads and writes files on the local filesystem through `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

/// An open local file and the position reads start from
#[derive(Debug)]
pub struct LocalHandle {
    file: File,
    position: u64,
}

impl LocalHandle {
    /// Current position in bytes from the start of the file
    pub fn position(&self) -> u64 {
        self.position
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    type Handle = LocalHandle;

    async fn length(&self, path: &Path) -> io::Result<u64> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        Ok(metadata.len())
    }

    async fn open(&self, path: &Path) -> io::Result<LocalHandle> {
        let file = File::open(path).await?;
        tracing::debug!("Opened local file: {}", path.display());
        Ok(LocalHandle { file, position: 0 })
    }

    async fn read(&self, handle: &mut LocalHandle, len: usize) -> io::Result<Vec<u8>> {
        // The OS cursor moves on every read, so re-anchor it to the tracked position
        handle.file.seek(SeekFrom::Start(handle.position)).await?;
        let mut buf = vec![0u8; len];
        handle.file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn seek(&self, handle: &mut LocalHandle, offset: u64) -> io::Result<()> {
        let target = handle.position.checked_add(offset).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek offset overflows u64")
        })?;
        handle.file.seek(SeekFrom::Start(target)).await?;
        handle.position = target;
        Ok(())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let path = path.to_path_buf();
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(io::Error::other)?
    }
}

/// Write `data` to a temp file next to `path`, then rename it over `path`.
///
/// Readers of `path` see either the old contents or the new ones, never a
/// partial write. Missing parent directories are created.
fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
