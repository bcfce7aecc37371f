//! Record implementations for auth models, plus password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use kpidash_core::ServiceError;
use kpidash_store::{ColumnDef, Record, TableDef, Value};

use crate::model::*;

// ── Password helpers ──

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hash: {}", e)))
}

/// Verify a password against an argon2id hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn check_password_strength(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

// ── User ──

impl Record for UserRecord {
    const TABLE: TableDef = TableDef {
        name: "users",
        columns: &[
            ColumnDef::text("username").unique(),
            ColumnDef::text("department").indexed(),
            ColumnDef::text("role"),
            ColumnDef::integer("active"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.user.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        let u = &self.user;
        vec![
            ("username", u.username.as_str().into()),
            ("department", u.department.as_str().into()),
            ("role", u.role.as_str().into()),
            ("active", Value::bool(u.active)),
            ("created_at", u.created_at.as_str().into()),
        ]
    }
}

// ── Department ──

impl Record for Department {
    const TABLE: TableDef = TableDef {
        name: "departments",
        columns: &[
            ColumnDef::text("name").unique(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "department";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── Session ──

impl Record for Session {
    const TABLE: TableDef = TableDef {
        name: "sessions",
        columns: &[
            ColumnDef::text("user_id").indexed(),
            ColumnDef::integer("revoked"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "session";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", self.user_id.as_str().into()),
            ("revoked", Value::bool(self.revoked)),
            ("created_at", self.issued_at.as_str().into()),
        ]
    }
}
