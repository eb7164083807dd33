//! In-memory filesystem backend with call counting and fault injection

use crate::Filesystem;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// A failure to inject into a [`MemoryFilesystem`] operation.
///
/// `nth` counts calls of that operation from 1 across the whole filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every `length` call fails
    Length,
    /// Every `open` call fails
    Open,
    /// The `nth` read fails
    Read { nth: u64 },
    /// The `nth` seek fails
    Seek { nth: u64 },
    /// Every `write` call fails
    Write,
}

/// Number of calls made to each operation, failed calls included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub length: u64,
    pub open: u64,
    pub reads: u64,
    pub seeks: u64,
    pub writes: u64,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, Vec<u8>>,
    faults: Vec<Fault>,
    counts: OpCounts,
    open_handles: usize,
}

impl State {
    fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }
}

/// A filesystem held entirely in memory.
///
/// Clones share the same files, counters, and faults.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    state: Arc<Mutex<State>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.lock().files.insert(path.into(), data.into());
    }

    /// Contents of a file, if it exists
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().files.contains_key(path.as_ref())
    }

    /// Make future calls fail as described by `fault`
    pub fn inject(&self, fault: Fault) {
        self.lock().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    pub fn counts(&self) -> OpCounts {
        self.lock().counts
    }

    /// Handles returned by `open` that have not been dropped yet
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn injected(op: &str) -> io::Error {
    io::Error::other(format!("injected {op} failure"))
}

/// An open in-memory file. Dropping it releases the handle.
#[derive(Debug)]
pub struct MemoryHandle {
    path: PathBuf,
    position: u64,
    state: Arc<Mutex<State>>,
}

impl MemoryHandle {
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

#[async_trait]
impl Filesystem for MemoryFilesystem {
    type Handle = MemoryHandle;

    async fn length(&self, path: &Path) -> io::Result<u64> {
        let mut state = self.lock();
        state.counts.length += 1;
        if state.has_fault(Fault::Length) {
            return Err(injected("length"));
        }
        state
            .files
            .get(path)
            .map(|data| data.len() as u64)
            .ok_or_else(|| not_found(path))
    }

    async fn open(&self, path: &Path) -> io::Result<MemoryHandle> {
        let mut state = self.lock();
        state.counts.open += 1;
        if state.has_fault(Fault::Open) {
            return Err(injected("open"));
        }
        if !state.files.contains_key(path) {
            return Err(not_found(path));
        }
        state.open_handles += 1;
        Ok(MemoryHandle {
            path: path.to_path_buf(),
            position: 0,
            state: Arc::clone(&self.state),
        })
    }

    async fn read(&self, handle: &mut MemoryHandle, len: usize) -> io::Result<Vec<u8>> {
        let mut state = self.lock();
        state.counts.reads += 1;
        let nth = state.counts.reads;
        if state.has_fault(Fault::Read { nth }) {
            return Err(injected("read"));
        }
        let data = state
            .files
            .get(&handle.path)
            .ok_or_else(|| not_found(&handle.path))?;

        let start = usize::try_from(handle.position).map_err(io::Error::other)?;
        let end = start.checked_add(len).filter(|end| *end <= data.len());
        match end {
            Some(end) => Ok(data[start..end].to_vec()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read of {len} bytes at offset {start} exceeds file length {}",
                    data.len()
                ),
            )),
        }
    }

    async fn seek(&self, handle: &mut MemoryHandle, offset: u64) -> io::Result<()> {
        let mut state = self.lock();
        state.counts.seeks += 1;
        let nth = state.counts.seeks;
        if state.has_fault(Fault::Seek { nth }) {
            return Err(injected("seek"));
        }
        let length = state
            .files
            .get(&handle.path)
            .map(|data| data.len() as u64)
            .ok_or_else(|| not_found(&handle.path))?;

        match handle.position.checked_add(offset) {
            Some(target) if target <= length => {
                handle.position = target;
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "seek by {offset} from {} exceeds file length {length}",
                    handle.position
                ),
            )),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        state.counts.writes += 1;
        if state.has_fault(Fault::Write) {
            return Err(injected("write"));
        }
        state.files.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}
