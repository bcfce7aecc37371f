use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::BlobError;
use crate::traits::{validate_key, BlobMeta, BlobStore};

/// In-process BlobStore used when the blob directory is unavailable and in tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> BlobError {
    BlobError::Io("memory blob store lock poisoned".into())
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        validate_key(key)?;
        self.blobs.write().map_err(poisoned)?.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        validate_key(key)?;
        Ok(self.blobs.read().map_err(poisoned)?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.blobs.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        validate_key(key)?;
        Ok(self.blobs.read().map_err(poisoned)?.contains_key(key))
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| BlobMeta {
                key: k.clone(),
                size: v.len() as u64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_prefix_only_touches_prefix() {
        let store = MemoryBlobStore::new();
        store.put("claims/c1/a1", b"1").unwrap();
        store.put("claims/c10/a2", b"2").unwrap();

        assert_eq!(store.delete_prefix("claims/c1/").unwrap(), 1);
        assert!(store.exists("claims/c10/a2").unwrap());
    }
}
