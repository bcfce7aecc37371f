use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KVError;

/// Key-value storage for per-user dashboard state.
///
/// Keys are `/`-separated namespaces, e.g. `layout/{user_id}`,
/// `calendar/{department}/{category}/2024-05`, `chart/{name}`.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// All `(key, value)` pairs whose key starts with `prefix`, sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}

/// JSON helpers available on every [`KVStore`].
pub trait KVStoreExt: KVStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KVError> {
        match self.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KVError::Serialization(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KVError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| KVError::Serialization(format!("{}: {}", key, e)))?;
        self.set(key, &bytes)
    }
}

impl<S: KVStore + ?Sized> KVStoreExt for S {}
