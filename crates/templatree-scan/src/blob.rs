//! Single-file blob storage for encoded trees.
//!
//! Each blob holds exactly one tree in its canonical text form. Writes go to
//! a temporary file in the blob directory which is then renamed over the
//! target, so a concurrent reader sees either the previous blob or the new
//! one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use templatree_core::{FilterPolicy, Result, TemplateError, TemplateFolder, codec};

use crate::scanner::TemplateScanner;

/// Location of a persisted blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    path: PathBuf,
}

impl BlobHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Directory of `<key>.json` blobs.
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handle for `key`, whether or not the blob exists yet.
    pub fn handle(&self, key: &str) -> Result<BlobHandle> {
        validate_key(key).map_err(|e| TemplateError::blob(&self.dir, e))?;
        Ok(BlobHandle {
            path: self.dir.join(format!("{key}.json")),
        })
    }

    /// Encode `tree` and atomically write it under `key`.
    pub fn persist(&self, tree: &TemplateFolder, key: &str) -> Result<BlobHandle> {
        let handle = self.handle(key)?;
        let text = codec::encode(tree)?;

        fs::create_dir_all(&self.dir).map_err(|e| TemplateError::blob(&self.dir, e))?;

        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|e| TemplateError::blob(&self.dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| TemplateError::blob(tmp.path(), e))?;
        tmp.persist(&handle.path)
            .map_err(|e| TemplateError::blob(&handle.path, e.error))?;

        debug!(path = %handle.path.display(), bytes = text.len(), "Persisted template blob");
        Ok(handle)
    }

    /// Read and decode a blob.
    pub fn load(&self, handle: &BlobHandle) -> Result<TemplateFolder> {
        let text = fs::read_to_string(&handle.path)
            .map_err(|e| TemplateError::blob(&handle.path, e))?;
        debug!(path = %handle.path.display(), "Loaded template blob");
        codec::decode(&text)
    }

    /// Delete a blob.
    pub fn remove(&self, handle: BlobHandle) -> Result<()> {
        fs::remove_file(&handle.path).map_err(|e| TemplateError::blob(&handle.path, e))?;
        debug!(path = %handle.path.display(), "Removed template blob");
        Ok(())
    }

    /// Write `tree`, read it back and delete the blob.
    ///
    /// The blob is removed even when reading it back fails.
    pub fn round_trip(&self, tree: &TemplateFolder, key: &str) -> Result<TemplateFolder> {
        let handle = self.persist(tree, key)?;
        let loaded = self.load(&handle);
        let removed = self.remove(handle);
        let tree = loaded?;
        removed?;
        Ok(tree)
    }

    /// Scan `root` and persist the tree under `key`.
    pub fn scan_to_blob(
        &self,
        scanner: &TemplateScanner,
        root: impl AsRef<Path>,
        key: &str,
        policy: &FilterPolicy,
    ) -> Result<BlobHandle> {
        let tree = scanner.scan(root, policy)?;
        self.persist(&tree, key)
    }
}

fn validate_key(key: &str) -> io::Result<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid blob key {key:?}"),
        ));
    }
    Ok(())
}
