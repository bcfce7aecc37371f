//! Server configuration, read from a TOML file.
//!
//! A bare context name resolves to `/etc/kpidash/<name>.toml`; anything that
//! looks like a path is used as given.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Directory searched for context names.
pub const CONFIG_DIR: &str = "/etc/kpidash";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub auth: AuthSection,
    pub admin: AdminConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// `sqlite` or `memory`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Use memory adapters when a persistent store cannot be opened.
    #[serde(default = "default_true")]
    pub fallback_to_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin")]
    pub username: String,
    /// argon2id PHC string.
    #[serde(default)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_department")]
    pub department: String,
    /// Password for CSV-imported users whose row has none.
    #[serde(default)]
    pub import_password: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            department: default_department(),
            import_password: String::new(),
        }
    }
}

/// Dashboard container and widget minimums, in pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    #[serde(default = "default_container_height")]
    pub container_height: f64,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            container_height: default_container_height(),
            min_width: default_min_width(),
            min_height: default_min_height(),
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> i64 {
    43200
}

fn default_cookie_name() -> String {
    "kpidash_session".to_string()
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_department() -> String {
    "Genel".to_string()
}

fn default_container_width() -> f64 {
    1600.0
}

fn default_container_height() -> f64 {
    1200.0
}

fn default_min_width() -> f64 {
    200.0
}

fn default_min_height() -> f64 {
    150.0
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(CONFIG_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[storage]
data_dir = "/var/lib/kpidash"
backend = "memory"
fallback_to_memory = false

[auth]
jwt_secret = "s3cret"
session_ttl_secs = 600
secure_cookie = true

[admin]
username = "yonetici"
password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"

[defaults]
department = "Üretim"
import_password = "Degistir123"

[layout]
container_width = 1920
container_height = 1080
"#;

    #[test]
    fn test_resolve_path() {
        assert_eq!(ServerConfig::resolve_path("fabrika"), PathBuf::from("/etc/kpidash/fabrika.toml"));
        assert_eq!(ServerConfig::resolve_path("./dev.toml"), PathBuf::from("./dev.toml"));
        assert_eq!(ServerConfig::resolve_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_parse_full() {
        let config = ServerConfig::parse(FULL).unwrap();
        assert_eq!(config.storage.backend, "memory");
        assert!(!config.storage.fallback_to_memory);
        assert_eq!(config.auth.session_ttl_secs, 600);
        assert_eq!(config.auth.cookie_name, "kpidash_session");
        assert_eq!(config.admin.username, "yonetici");
        assert_eq!(config.defaults.department, "Üretim");
        assert_eq!(config.layout.container_width, 1920.0);
        assert_eq!(config.layout.min_height, 150.0);
    }

    #[test]
    fn test_parse_minimal_uses_defaults() {
        let config = ServerConfig::parse(
            "[storage]\ndata_dir = \"/data\"\n[auth]\njwt_secret = \"x\"\n[admin]\npassword_hash = \"h\"\n",
        )
        .unwrap();
        assert_eq!(config.storage.backend, "sqlite");
        assert!(config.storage.fallback_to_memory);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.defaults.department, "Genel");
        assert_eq!(config.layout.container_height, 1200.0);
    }

    #[test]
    fn test_missing_section_is_error() {
        assert!(ServerConfig::parse("[storage]\ndata_dir = \"/data\"\n").is_err());
    }
}
