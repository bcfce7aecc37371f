use std::path::PathBuf;

/// Storage locations shared by all modules.
///
/// Only `data_dir` is usually set; the individual paths default to files and
/// directories underneath it.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Root directory for all persistent state.
    pub data_dir: Option<PathBuf>,

    /// SQLite database holding the entity tables.
    /// Defaults to `{data_dir}/data.sqlite`.
    pub sqlite_path: Option<PathBuf>,

    /// redb file holding layouts, preferences, calendars and chart datasets.
    /// Defaults to `{data_dir}/data.redb`.
    pub kv_path: Option<PathBuf>,

    /// Directory for claim attachment bytes.
    /// Defaults to `{data_dir}/blobs/`.
    pub blob_dir: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.sqlite"))
    }

    pub fn resolve_kv_path(&self) -> PathBuf {
        self.kv_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    pub fn resolve_blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("blobs"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}
