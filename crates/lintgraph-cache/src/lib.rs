//! Content-addressed cache for analysis results.
//!
//! Entries are opaque payloads keyed by a hex SHA-256 [`Fingerprint`] of a
//! unit's inputs. The cache is purely a performance optimization: a failed
//! read is a miss and callers never fail a run because a write failed.

pub mod error;
pub mod fingerprint;
pub mod fs_cache;
pub mod memory;

pub use error::CacheError;
pub use fingerprint::Fingerprint;
pub use fs_cache::FsCache;
pub use memory::MemoryCache;

/// A flat key/value store from fingerprint to payload.
///
/// Implementations must be safe to share between tasks; a store has no notion
/// of a run and entries never expire.
pub trait ContentCache: Send + Sync {
    /// Fetch the payload stored under `key`, `Ok(None)` when absent.
    fn get(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `payload` under `key`, replacing any previous entry.
    fn set(&self, key: &Fingerprint, payload: &[u8]) -> Result<(), CacheError>;

    /// Remove the entry under `key`. Removing an absent key is not an error.
    fn delete(&self, key: &Fingerprint) -> Result<(), CacheError>;
}
