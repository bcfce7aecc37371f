//! Storage selection: persistent adapters under the data dir, or memory.

use std::path::PathBuf;
use std::sync::Arc;

use kpidash_blob::{BlobStore, FileStore, MemoryBlobStore};
use kpidash_core::ServiceConfig;
use kpidash_kv::{KVStore, MemoryKV, RedbStore};
use kpidash_sql::SqliteStore;
use kpidash_store::{MemoryRecords, RecordStore, SqlRecords};
use tracing::{info, warn};

use crate::config::StorageConfig;

/// The three stores shared by every module.
pub struct Stores {
    pub records: Arc<dyn RecordStore>,
    pub kv: Arc<dyn KVStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            records: Arc::new(MemoryRecords::new()),
            kv: Arc::new(MemoryKV::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }

    /// Backend of the record store, reported by `/health`.
    pub fn backend(&self) -> &'static str {
        self.records.backend()
    }
}

/// Open `primary`; on failure fall back to `memory` when allowed.
fn open_or_fallback<T: ?Sized>(
    what: &str,
    fallback: bool,
    primary: impl FnOnce() -> Result<Arc<T>, String>,
    memory: impl FnOnce() -> Arc<T>,
) -> anyhow::Result<Arc<T>> {
    match primary() {
        Ok(store) => Ok(store),
        Err(e) if fallback => {
            warn!(store = what, error = %e, "cannot open persistent store, using memory");
            Ok(memory())
        }
        Err(e) => anyhow::bail!("failed to open {}: {}", what, e),
    }
}

/// Open the stores named by the `[storage]` section.
pub fn open_stores(config: &StorageConfig) -> anyhow::Result<Stores> {
    match config.backend.as_str() {
        "memory" => {
            info!("storage backend: memory (nothing is persisted)");
            Ok(Stores::memory())
        }
        "sqlite" => open_persistent(config),
        other => anyhow::bail!("unknown storage backend '{}' (expected sqlite or memory)", other),
    }
}

fn open_persistent(config: &StorageConfig) -> anyhow::Result<Stores> {
    let paths = ServiceConfig {
        data_dir: Some(PathBuf::from(&config.data_dir)),
        ..Default::default()
    };
    let fallback = config.fallback_to_memory;
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        if !fallback {
            anyhow::bail!("cannot create data dir {}: {}", config.data_dir, e);
        }
        warn!(data_dir = %config.data_dir, error = %e, "cannot create data dir");
    }

    let sqlite_path = paths.resolve_sqlite_path();
    let records = open_or_fallback::<dyn RecordStore>(
        "sqlite",
        fallback,
        || {
            let sql = SqliteStore::open(&sqlite_path).map_err(|e| e.to_string())?;
            let records: Arc<dyn RecordStore> = Arc::new(SqlRecords::new(Arc::new(sql)));
            Ok(records)
        },
        || -> Arc<dyn RecordStore> { Arc::new(MemoryRecords::new()) },
    )?;

    let kv_path = paths.resolve_kv_path();
    let kv = open_or_fallback::<dyn KVStore>(
        "kv",
        fallback,
        || {
            let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open(&kv_path).map_err(|e| e.to_string())?);
            Ok(kv)
        },
        || -> Arc<dyn KVStore> { Arc::new(MemoryKV::new()) },
    )?;

    let blob_dir = paths.resolve_blob_dir();
    let blobs = open_or_fallback::<dyn BlobStore>(
        "blobs",
        fallback,
        || {
            let blobs: Arc<dyn BlobStore> = Arc::new(FileStore::open(&blob_dir).map_err(|e| e.to_string())?);
            Ok(blobs)
        },
        || -> Arc<dyn BlobStore> { Arc::new(MemoryBlobStore::new()) },
    )?;

    info!(
        records = records.backend(),
        sqlite = %sqlite_path.display(),
        kv = %kv_path.display(),
        blobs = %blob_dir.display(),
        "storage opened"
    );
    Ok(Stores { records, kv, blobs })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(data_dir: &str, backend: &str, fallback: bool) -> StorageConfig {
        StorageConfig {
            data_dir: data_dir.to_string(),
            backend: backend.to_string(),
            fallback_to_memory: fallback,
        }
    }

    #[test]
    fn test_sqlite_backend_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let stores = open_stores(&storage(data_dir.to_str().unwrap(), "sqlite", false)).unwrap();
        assert_eq!(stores.backend(), "sqlite");
        assert!(data_dir.join("data.sqlite").exists());
        assert!(data_dir.join("data.redb").exists());
        assert!(data_dir.join("blobs").is_dir());
    }

    #[test]
    fn test_memory_backend() {
        let stores = open_stores(&storage("/nonexistent", "memory", false)).unwrap();
        assert_eq!(stores.backend(), "memory");
    }

    #[test]
    fn test_unopenable_dir_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let data_dir = file.to_str().unwrap();

        let stores = open_stores(&storage(data_dir, "sqlite", true)).unwrap();
        assert_eq!(stores.backend(), "memory");

        assert!(open_stores(&storage(data_dir, "sqlite", false)).is_err());
    }

    #[test]
    fn test_unknown_backend() {
        assert!(open_stores(&storage("/data", "mssql", true)).is_err());
    }
}
