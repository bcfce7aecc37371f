//! Bootstrap: first-start checks and admin account creation.
//!
//! When kpidashd starts:
//! 1. Verify the config has an admin password hash, a JWT secret and a data
//!    dir; refuse to start otherwise.
//! 2. Ensure the configured admin user exists.

use auth::service::AuthService;
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.admin.password_hash.is_empty() {
        anyhow::bail!(
            "No admin password hash found in configuration.\n\
             Run `kpidashd hash-password` and put the result in [admin] password_hash."
        );
    }
    if config.auth.jwt_secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.admin.username.trim().is_empty() {
        anyhow::bail!("Admin username is empty in configuration.");
    }
    Ok(())
}

/// Ensure the configured admin account exists. Creates it if missing; an
/// existing account keeps its current password.
pub fn ensure_admin(auth: &AuthService, config: &ServerConfig) -> anyhow::Result<()> {
    let admin = auth
        .ensure_admin(config.admin.username.trim(), &config.admin.password_hash)
        .map_err(|e| anyhow::anyhow!("failed to create admin user: {}", e))?;
    info!(username = %admin.username, "admin account ready");
    Ok(())
}
