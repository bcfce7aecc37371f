pub mod department;
pub mod import;
pub mod session;
pub mod user;

use std::sync::Arc;

use kpidash_core::ServiceError;
use kpidash_store::{ActivityLog, RecordStore, RecordStoreExt};

use crate::model::{Department, Session, UserRecord};

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Session lifetime in seconds (default: 12h).
    pub session_ttl_secs: i64,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Add `Secure` to the session cookie.
    pub secure_cookie: bool,
    /// Department for users created without one.
    pub default_department: String,
    /// Password for imported users whose row has none. Empty disables it.
    pub import_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "kpidash-dev-secret-change-me".to_string(),
            session_ttl_secs: 43200,
            cookie_name: "kpidash_session".to_string(),
            secure_cookie: false,
            default_department: "Genel".to_string(),
            import_password: String::new(),
        }
    }
}

/// Users, departments and sessions.
pub struct AuthService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) activity: ActivityLog,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create the service, registering its tables.
    pub fn new(
        store: Arc<dyn RecordStore>,
        activity: ActivityLog,
        config: AuthConfig,
    ) -> Result<Arc<Self>, ServiceError> {
        store.ensure::<UserRecord>()?;
        store.ensure::<Department>()?;
        store.ensure::<Session>()?;
        Ok(Arc::new(Self {
            store,
            activity,
            config,
        }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use kpidash_core::{Principal, Role};
    use kpidash_store::{ActivityLog, MemoryRecords, RecordStore, SqlRecords};

    use super::{AuthConfig, AuthService};
    use crate::model::CreateUser;

    pub fn memory_service() -> Arc<AuthService> {
        service_over(Arc::new(MemoryRecords::new()))
    }

    pub fn sqlite_service() -> Arc<AuthService> {
        let sql = kpidash_sql::SqliteStore::open_in_memory().unwrap();
        service_over(Arc::new(SqlRecords::new(Arc::new(sql))))
    }

    pub fn service_over(store: Arc<dyn RecordStore>) -> Arc<AuthService> {
        let activity = ActivityLog::new(store.clone()).unwrap();
        let config = AuthConfig {
            import_password: "degistir".to_string(),
            ..AuthConfig::default()
        };
        AuthService::new(store, activity, config).unwrap()
    }

    pub fn admin() -> Principal {
        Principal {
            user_id: "admin-id".into(),
            username: "admin".into(),
            role: Role::Admin,
            department: "Genel".into(),
        }
    }

    pub fn new_user(username: &str, password: &str) -> CreateUser {
        CreateUser {
            username: username.into(),
            password: password.into(),
            display_name: None,
            email: None,
            role: None,
            department: None,
            active: None,
        }
    }
}
