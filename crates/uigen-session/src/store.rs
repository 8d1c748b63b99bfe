//! Ephemeral work store
//!
//! Holds at most one [`AnonymousWorkSnapshot`]. Pre-auth chat writes it with
//! `put`; the reconciler reads it once per attempt and clears it only after a
//! successful adoption.
//!
//! Backends:
//! - [`MemoryWorkStore`]: process-local
//! - [`FileWorkStore`]: one JSON document on disk

use crate::error::StoreError;
use crate::persist;
use crate::types::AnonymousWorkSnapshot;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Synchronous, client-local snapshot cache
#[cfg_attr(test, mockall::automock)]
pub trait WorkStore: Send + Sync {
    /// Current snapshot, if any
    ///
    /// # Errors
    /// `StoreError` if the backing storage cannot be read.
    fn get(&self) -> Result<Option<AnonymousWorkSnapshot>, StoreError>;

    /// Replace the snapshot
    ///
    /// # Errors
    /// `StoreError` if the backing storage cannot be written.
    fn put(&self, snapshot: AnonymousWorkSnapshot) -> Result<(), StoreError>;

    /// Drop the snapshot
    ///
    /// # Errors
    /// `StoreError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory work store
#[derive(Debug, Default)]
pub struct MemoryWorkStore {
    slot: Mutex<Option<AnonymousWorkSnapshot>>,
}

impl MemoryWorkStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store already holding `snapshot`
    #[inline]
    #[must_use]
    pub fn with_snapshot(snapshot: AnonymousWorkSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
        }
    }
}

impl WorkStore for MemoryWorkStore {
    fn get(&self) -> Result<Option<AnonymousWorkSnapshot>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    fn put(&self, snapshot: AnonymousWorkSnapshot) -> Result<(), StoreError> {
        *self.slot.lock() = Some(snapshot);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.slot.lock().take();
        Ok(())
    }
}

/// Work store persisted as a single JSON file
///
/// A missing file is an empty store. A file that no longer parses is treated
/// as empty too, so a stale cache can never block sign-in.
#[derive(Debug, Clone)]
pub struct FileWorkStore {
    path: PathBuf,
}

impl FileWorkStore {
    /// File name used under a data directory
    pub const FILE_NAME: &'static str = "anon-work.json";

    /// Create store at an explicit file path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create store at `<dir>/anon-work.json`
    #[inline]
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkStore for FileWorkStore {
    fn get(&self) -> Result<Option<AnonymousWorkSnapshot>, StoreError> {
        match persist::read_json::<AnonymousWorkSnapshot, StoreError>(&self.path) {
            Ok(snapshot) => Ok(snapshot),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable work snapshot");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn put(&self, snapshot: AnonymousWorkSnapshot) -> Result<(), StoreError> {
        persist::write_json_atomic::<_, StoreError>(&self.path, &snapshot)
    }

    fn clear(&self) -> Result<(), StoreError> {
        persist::remove_file(&self.path).map_err(StoreError::from)
    }
}
