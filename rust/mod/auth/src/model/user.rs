use kpidash_core::Role;
use serde::{Deserialize, Serialize};

/// A dashboard account as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name, unique.
    pub username: String,

    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Role,

    pub department: String,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

/// Stored form of a user. The argon2id hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Query parameters for `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            department: None,
            role: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Outcome of a CSV user import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Spreadsheet row number (the header is row 1).
    pub row: usize,
    pub reason: String,
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    50
}
