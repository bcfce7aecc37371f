use crate::error::BlobError;

/// Metadata for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub key: String,
    pub size: u64,
}

/// Storage for binary objects such as claim attachments.
///
/// Keys are relative, `/`-separated paths: `claims/{claim_id}/{attachment_id}`.
pub trait BlobStore: Send + Sync {
    /// Store a blob, overwriting any existing one.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    fn exists(&self, key: &str) -> Result<bool, BlobError>;

    /// Blobs whose key starts with `prefix`, sorted by key.
    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError>;

    /// Delete every blob under `prefix`. Returns how many were removed.
    fn delete_prefix(&self, prefix: &str) -> Result<usize, BlobError> {
        let blobs = self.list(prefix)?;
        for meta in &blobs {
            self.delete(&meta.key)?;
        }
        Ok(blobs.len())
    }
}

/// Reject keys that are empty, absolute, or contain `..` / backslashes.
pub(crate) fn validate_key(key: &str) -> Result<(), BlobError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}
