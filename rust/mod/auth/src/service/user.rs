use kpidash_core::{
    department_or_default, merge_patch, new_id, now_rfc3339, ListResult, Principal, Role,
    ServiceError, MAX_LIST_LIMIT,
};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{CreateUser, Session, User, UserQuery, UserRecord};
use crate::service::AuthService;
use crate::store_impls::{check_password_strength, hash_password};

/// The principal a user acts as once signed in.
pub fn principal_of(user: &User) -> Principal {
    Principal {
        user_id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
        department: user.department.clone(),
    }
}

fn clean_username(username: &str) -> Result<String, ServiceError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ServiceError::Validation("username is required".into()));
    }
    Ok(username.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AuthService {
    /// Validate input and store a new user with an already-hashed password.
    pub(crate) fn insert_user(&self, input: CreateUser, password_hash: String) -> Result<User, ServiceError> {
        let username = clean_username(&input.username)?;
        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            display_name: blank_to_none(input.display_name).unwrap_or_else(|| username.clone()),
            username,
            email: blank_to_none(input.email),
            role: input.role.unwrap_or_default(),
            department: department_or_default(input.department.as_deref(), &self.config.default_department),
            active: input.active.unwrap_or(true),
            last_login_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let record = UserRecord { user, password_hash };
        self.store.create(&record).map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("username '{}' already exists", record.user.username))
            }
            other => other,
        })?;
        Ok(record.user)
    }

    /// Create a user (admin only at the HTTP layer).
    pub fn create_user(&self, actor: &Principal, input: CreateUser) -> Result<User, ServiceError> {
        check_password_strength(&input.password)?;
        let hash = hash_password(&input.password)?;
        let user = self.insert_user(input, hash)?;
        self.activity.record(
            actor,
            Action::Create,
            "user",
            &user.id,
            Some(serde_json::json!({ "username": user.username })),
        );
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        Ok(self.store.fetch::<UserRecord>(id)?.user)
    }

    pub(crate) fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, ServiceError> {
        let query = Query::new()
            .filter(Filter::eq("username", username.trim()))
            .page(1, 0);
        let (mut found, _) = self.store.query::<UserRecord>(&query)?;
        Ok(found.pop())
    }

    pub fn list_users(&self, params: &UserQuery) -> Result<ListResult<User>, ServiceError> {
        let query = Query::new()
            .eq_opt("department", params.department.as_deref())
            .eq_opt("role", params.role.map(|r| r.as_str()))
            .page(params.limit.clamp(1, MAX_LIST_LIMIT), params.offset);
        let (records, total) = self.store.query::<UserRecord>(&query)?;
        Ok(ListResult {
            items: records.into_iter().map(|r| r.user).collect(),
            total,
        })
    }

    /// Update a user with JSON merge-patch semantics. A `password` key is
    /// validated and re-hashed; `id`, `created_at` and `last_login_at` are
    /// not client-writable. Deactivating a user revokes their sessions.
    pub fn update_user(&self, actor: &Principal, id: &str, patch: serde_json::Value) -> Result<User, ServiceError> {
        let mut record = self.store.fetch::<UserRecord>(id)?;
        let mut patch = patch;

        let new_password = match patch.as_object_mut().and_then(|o| o.remove("password")) {
            Some(serde_json::Value::String(p)) => Some(p),
            Some(serde_json::Value::Null) | None => None,
            Some(_) => return Err(ServiceError::Validation("password must be a string".into())),
        };
        let changed: Vec<String> = patch
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();

        let current = record.user.clone();
        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["last_login_at"] = serde_json::json!(current.last_login_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());

        let mut user: User = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid user: {}", e)))?;
        user.username = clean_username(&user.username)?;
        user.department = department_or_default(Some(&user.department), &self.config.default_department);

        if let Some(p) = new_password {
            check_password_strength(&p)?;
            record.password_hash = hash_password(&p)?;
        }
        record.user = user;

        if !self.store.save(&record)? {
            return Err(ServiceError::not_found("user", id));
        }
        if current.active && !record.user.active {
            self.revoke_user_sessions(id)?;
        }

        self.activity.record(
            actor,
            Action::Update,
            "user",
            id,
            Some(serde_json::json!({ "fields": changed })),
        );
        Ok(record.user)
    }

    /// Delete a user and their sessions. Users cannot delete themselves.
    pub fn delete_user(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if actor.user_id == id {
            return Err(ServiceError::Validation("cannot delete your own account".into()));
        }
        let user = self.get_user(id)?;
        self.store.remove_where::<Session>(&[Filter::eq("user_id", id)])?;
        if !self.store.remove::<UserRecord>(id)? {
            return Err(ServiceError::not_found("user", id));
        }
        self.activity.record(
            actor,
            Action::Delete,
            "user",
            id,
            Some(serde_json::json!({ "username": user.username })),
        );
        Ok(())
    }

    /// Make sure the configured administrator exists. Existing accounts are
    /// left untouched.
    pub fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<User, ServiceError> {
        if let Some(existing) = self.find_by_username(username)? {
            tracing::info!(username, "admin user already exists");
            return Ok(existing.user);
        }
        let input = CreateUser {
            username: username.to_string(),
            password: String::new(),
            display_name: Some("Administrator".to_string()),
            email: None,
            role: Some(Role::Admin),
            department: None,
            active: Some(true),
        };
        let user = self.insert_user(input, password_hash.to_string())?;
        tracing::info!(username, "created admin user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::service::testing::{admin, memory_service, new_user, sqlite_service};

    #[test]
    fn create_applies_defaults() {
        for svc in [memory_service(), sqlite_service()] {
            let user = svc.create_user(&admin(), new_user("  ayse ", "gizli123")).unwrap();
            assert_eq!(user.username, "ayse");
            assert_eq!(user.display_name, "ayse");
            assert_eq!(user.department, "Genel");
            assert_eq!(user.role, Role::User);
            assert!(user.active);

            let json = serde_json::to_value(&user).unwrap();
            assert!(json.get("password_hash").is_none());
        }
    }

    #[test]
    fn duplicate_username_conflicts() {
        for svc in [memory_service(), sqlite_service()] {
            svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
            let err = svc.create_user(&admin(), new_user("ayse", "baska123")).unwrap_err();
            assert!(matches!(err, ServiceError::Conflict(_)), "{:?}", err);
        }
    }

    #[test]
    fn create_validates_input() {
        let svc = memory_service();
        assert!(matches!(
            svc.create_user(&admin(), new_user("", "gizli123")),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_user(&admin(), new_user("ali", "123")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn list_filters_by_department() {
        let svc = sqlite_service();
        let mut q = new_user("ali", "gizli123");
        q.department = Some("Kalite".into());
        svc.create_user(&admin(), q).unwrap();
        svc.create_user(&admin(), new_user("veli", "gizli123")).unwrap();

        let params = UserQuery {
            department: Some("Kalite".into()),
            ..UserQuery::default()
        };
        let result = svc.list_users(&params).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].username, "ali");
        assert_eq!(svc.list_users(&UserQuery::default()).unwrap().total, 2);
    }

    #[test]
    fn update_merges_and_protects_fields() {
        let svc = memory_service();
        let user = svc.create_user(&admin(), new_user("ali", "gizli123")).unwrap();

        let updated = svc
            .update_user(
                &admin(),
                &user.id,
                json!({"display_name": "Ali Veli", "role": "manager", "id": "hacked", "department": ""}),
            )
            .unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.display_name, "Ali Veli");
        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.department, "Genel");
        assert_eq!(updated.created_at, user.created_at);
    }

    #[test]
    fn update_rehashes_password() {
        let svc = memory_service();
        let user = svc.create_user(&admin(), new_user("ali", "gizli123")).unwrap();
        svc.update_user(&admin(), &user.id, json!({"password": "yenisifre"})).unwrap();

        assert!(svc.login("ali", "gizli123").is_err());
        assert!(svc.login("ali", "yenisifre").is_ok());

        assert!(matches!(
            svc.update_user(&admin(), &user.id, json!({"password": "kisa"})),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn delete_removes_user_but_not_self() {
        let svc = memory_service();
        let user = svc.create_user(&admin(), new_user("ali", "gizli123")).unwrap();

        let me = principal_of(&user);
        assert!(matches!(svc.delete_user(&me, &user.id), Err(ServiceError::Validation(_))));

        svc.delete_user(&admin(), &user.id).unwrap();
        assert!(matches!(svc.get_user(&user.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_user(&admin(), &user.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let svc = memory_service();
        let hash = hash_password("yonetici1").unwrap();
        let first = svc.ensure_admin("admin", &hash).unwrap();
        let second = svc.ensure_admin("admin", &hash).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::Admin);
        assert!(svc.login("admin", "yonetici1").is_ok());
    }
}
