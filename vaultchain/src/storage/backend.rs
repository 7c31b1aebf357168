//! # Key-Value Backend Seam
//!
//! The overlay never talks to a storage engine directly — it talks to
//! [`KvStore`], a named-bucket abstraction over get/put/delete/iterate
//! with raw byte keys and values. Two implementations ship with the crate:
//!
//! - [`SledStore`] — the production backend, one sled tree per bucket.
//!   sled gives us lock-free concurrent reads, serialized writes, and
//!   per-key atomicity, which is all this layer assumes.
//! - [`MemoryStore`] — BTreeMap buckets behind a `parking_lot` lock.
//!   The test backend: no filesystem, no cleanup, identical semantics.
//!
//! No transactions are assumed beyond single-key atomicity. Retry policy
//! belongs to the engine or the caller; failures surface as
//! [`StoreError::Backend`] and stop there.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use parking_lot::RwLock;

use super::StoreError;

/// Named-bucket key-value contract the overlay is generic over.
///
/// `iterate` yields entries in ascending byte order of their keys — both
/// shipped backends store keys sorted, and the anchor index relies on it.
pub trait KvStore {
    /// Store `value` under `key` in the named bucket, overwriting.
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Fetch the value under `key`, or `None` if absent.
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove the entry under `key`. Removing an absent key is a no-op.
    fn delete(&self, bucket: &str, key: &[u8]) -> Result<(), StoreError>;

    /// All entries of the bucket, ascending by key bytes.
    fn iterate(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Flush pending writes and release engine resources.
    fn close(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory backend: a BTreeMap per bucket behind one RwLock.
///
/// Intended for tests and ephemeral tooling. Readers share the lock;
/// writers take it exclusively, which trivially satisfies the single-key
/// atomicity the contract asks for.
#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write();
        buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let buckets = self.buckets.read();
        Ok(buckets.get(bucket).and_then(|b| b.get(key).cloned()))
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write();
        if let Some(b) = buckets.get_mut(bucket) {
            b.remove(key);
        }
        Ok(())
    }

    fn iterate(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let buckets = self.buckets.read();
        Ok(buckets
            .get(bucket)
            .map(|b| b.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledStore
// ---------------------------------------------------------------------------

/// Persistent backend over sled, one tree per bucket.
///
/// Trees are opened per call; sled caches open trees internally so this
/// costs a map lookup, not an I/O operation.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(SledStore { db })
    }

    /// A temporary database cleaned up on drop. For tests.
    pub fn open_temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(SledStore { db })
    }

    fn tree(&self, bucket: &str) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(bucket)?)
    }
}

impl KvStore for SledStore {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.tree(bucket)?.insert(key, value)?;
        Ok(())
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tree(bucket)?.get(key)?.map(|ivec| ivec.to_vec()))
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<(), StoreError> {
        self.tree(bucket)?.remove(key)?;
        Ok(())
    }

    fn iterate(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut entries = Vec::new();
        for item in self.tree(bucket)?.iter() {
            let (k, v) = item?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        Ok(entries)
    }

    fn close(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
