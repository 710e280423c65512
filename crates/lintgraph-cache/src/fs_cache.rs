//! Filesystem-backed result cache.
//!
//! One file per entry, named by the fingerprint hex, directly under the cache
//! root. Each write goes through its own temporary file and a rename, so
//! concurrent processes sharing a cache directory never read a torn entry.

use std::fs;
use std::path::{Path, PathBuf};

use lintgraph_util::errors::LintError;
use lintgraph_util::fs::{dir_size, write_atomic};

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::ContentCache;

const ENTRY_EXT: &str = "json";

/// Result cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    /// Create a cache rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };
        entries
            .flatten()
            .filter(|e| is_entry(&e.path()))
            .count()
    }

    /// Total size of the cache directory in bytes.
    pub fn size(&self) -> u64 {
        dir_size(&self.root)
    }

    /// Remove every cached entry. Returns the number of bytes freed.
    pub fn clean(&self) -> miette::Result<u64> {
        let size = self.size();
        if self.root.is_dir() {
            fs::remove_dir_all(&self.root).map_err(LintError::Io)?;
        }
        Ok(size)
    }

    fn entry_path(&self, key: &Fingerprint) -> PathBuf {
        self.root.join(format!("{}.{ENTRY_EXT}", key.as_str()))
    }
}

impl ContentCache for FsCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache miss for {key}");
                Ok(None)
            }
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn set(&self, key: &Fingerprint, payload: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        write_atomic(&path, payload).map_err(|source| CacheError::Io { path, source })?;
        tracing::debug!("Stored {} byte(s) under {key}", payload.len());
        Ok(())
    }

    fn delete(&self, key: &Fingerprint) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }
}

fn is_entry(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| ext == ENTRY_EXT)
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(Fingerprint::from_hex)
            .is_some()
}
