//! Durable snapshot storage for the persisted state subset.
//!
//! The store writes one opaque serialized snapshot after every commit and
//! reads it back once at startup. Failures here are always recovered at
//! the store boundary; implementations just report them.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single-slot durable store for the serialized state snapshot.
pub trait SnapshotStorage {
    /// Read the snapshot, if one exists.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the snapshot.
    fn save(&mut self, snapshot: &str) -> Result<()>;

    /// Remove the snapshot entirely (logout).
    fn clear(&mut self) -> Result<()>;
}

/// File-backed snapshot storage.
///
/// Writes go through a temp file and rename so a crash mid-write leaves
/// either the old snapshot or the new one, never a torn file.
pub struct FileSnapshots {
    path: PathBuf,
}

impl FileSnapshots {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        path.set_extension("tmp");
        path
    }
}

impl SnapshotStorage for FileSnapshots {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(snapshot.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory snapshot storage for tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemorySnapshots {
    slot: Option<String>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with an existing snapshot (e.g. to simulate a
    /// previous run).
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            slot: Some(snapshot.into()),
        }
    }
}

impl SnapshotStorage for MemorySnapshots {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<()> {
        self.slot = Some(snapshot.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }
}
