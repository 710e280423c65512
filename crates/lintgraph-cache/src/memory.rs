//! In-process result cache, used when the on-disk cache is disabled and in
//! tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::ContentCache;

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Fingerprint, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Fingerprint, Vec<u8>>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("memory cache lock poisoned".into()))
    }
}

impl ContentCache for MemoryCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &Fingerprint, payload: &[u8]) -> Result<(), CacheError> {
        self.lock()?.insert(key.clone(), payload.to_vec());
        Ok(())
    }

    fn delete(&self, key: &Fingerprint) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
