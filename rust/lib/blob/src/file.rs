use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BlobError;
use crate::traits::{validate_key, BlobMeta, BlobStore};

fn io(e: std::io::Error) -> BlobError {
    BlobError::Io(e.to_string())
}

/// BlobStore backed by the local filesystem.
///
/// Key `claims/c1/a1` maps to `{base_dir}/claims/c1/a1`; parent directories
/// are created on `put`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open a FileStore rooted at `base_dir`, creating the directory if needed.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir).map_err(io)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        validate_key(key)?;
        Ok(self.base_dir.join(key))
    }

    fn walk_dir(&self, dir: &Path, prefix: &str, results: &mut Vec<BlobMeta>) -> Result<(), BlobError> {
        if !dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(dir).map_err(io)? {
            let entry = entry.map_err(io)?;
            let path = entry.path();
            if path.is_dir() {
                self.walk_dir(&path, prefix, results)?;
                continue;
            }
            let Ok(rel) = path.strip_prefix(&self.base_dir) else {
                continue;
            };
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                let size = entry.metadata().map_err(io)?.len();
                results.push(BlobMeta { key, size });
            }
        }
        Ok(())
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(&path, data).map_err(io)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).map(Some).map_err(io)
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(io)?;
            tracing::debug!(key, "blob deleted");
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.resolve(key)?.is_file())
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let mut results = Vec::new();
        self.walk_dir(&self.base_dir, prefix, &mut results)?;
        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.put("claims/c1/a1", b"photo").unwrap();
        store.put("claims/c1/a2", b"report").unwrap();
        store.put("claims/c2/a3", b"x").unwrap();

        assert_eq!(store.get("claims/c1/a1").unwrap(), Some(b"photo".to_vec()));
        let listed = store.list("claims/c1/").unwrap();
        assert_eq!(
            listed,
            vec![
                BlobMeta { key: "claims/c1/a1".into(), size: 5 },
                BlobMeta { key: "claims/c1/a2".into(), size: 6 },
            ]
        );

        assert_eq!(store.delete_prefix("claims/c1/").unwrap(), 2);
        assert!(!store.exists("claims/c1/a2").unwrap());
        assert!(store.exists("claims/c2/a3").unwrap());
    }

    #[test]
    fn rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(store.put("../escape", b"x"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.put("/abs", b"x"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.get("a//b"), Err(BlobError::InvalidKey(_))));
    }
}
