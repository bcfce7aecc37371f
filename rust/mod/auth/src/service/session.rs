use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use kpidash_core::{new_id, now_rfc3339, Principal, ServiceError};
use kpidash_store::{Action, Filter, Query, RecordStoreExt, Value};

use crate::model::{ChangePassword, Claims, LoginResponse, Session, User, UserRecord};
use crate::service::AuthService;
use crate::store_impls::{check_password_strength, hash_password, verify_password};

/// Extract the session token: `Authorization: Bearer` first, then the cookie.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl AuthService {
    /// Check credentials and open a session.
    ///
    /// Unknown users and wrong passwords are indistinguishable; deactivated
    /// accounts get a permission error.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let bad_credentials = || ServiceError::Unauthorized("invalid username or password".into());

        let mut record = self.find_by_username(username)?.ok_or_else(bad_credentials)?;
        if !verify_password(password, &record.password_hash) {
            tracing::info!(username, "login rejected");
            return Err(bad_credentials());
        }
        if !record.user.active {
            return Err(ServiceError::PermissionDenied(format!(
                "user '{}' is deactivated",
                record.user.username
            )));
        }

        record.user.last_login_at = Some(now_rfc3339());
        self.store.save(&record)?;

        self.prune_expired_sessions(&record.user.id)?;
        let token = self.issue_token(&record.user)?;
        let principal = crate::service::user::principal_of(&record.user);
        self.activity.record(&principal, Action::Login, "user", &record.user.id, None);
        tracing::info!(username = %record.user.username, "login");

        Ok(LoginResponse {
            user: record.user,
            token,
            expires_in: self.config.session_ttl_secs,
        })
    }

    /// Sign a JWT for `user` and store the session it refers to.
    pub fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.session_ttl_secs);

        let session = Session {
            id: new_id(),
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: exp.to_rfc3339(),
            revoked: false,
        };
        let claims = Claims {
            sub: user.id.clone(),
            sid: session.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("JWT encode failed: {}", e)))?;

        self.store.create(&session)?;
        Ok(token)
    }

    /// Decode a token and check that its session is still open.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let claims = self.decode_token(token)?;
        match self.store.find::<Session>(&claims.sid)? {
            Some(session) if !session.revoked => Ok(claims),
            Some(_) => Err(ServiceError::Unauthorized("session has been revoked".into())),
            None => Err(ServiceError::Unauthorized("session not found".into())),
        }
    }

    fn decode_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))
    }

    /// Revoke the session carried by the request. Missing or invalid tokens
    /// are ignored so logout always succeeds.
    pub fn logout(&self, headers: &HeaderMap) -> Result<(), ServiceError> {
        let Some(token) = token_from_headers(headers, &self.config.cookie_name) else {
            return Ok(());
        };
        let Ok(claims) = self.decode_token(&token) else {
            return Ok(());
        };
        if let Some(mut session) = self.store.find::<Session>(&claims.sid)? {
            if !session.revoked {
                session.revoked = true;
                self.store.save(&session)?;
            }
            if let Some(record) = self.store.find::<UserRecord>(&session.user_id)? {
                let principal = crate::service::user::principal_of(&record.user);
                self.activity.record(&principal, Action::Logout, "user", &record.user.id, None);
            }
        }
        Ok(())
    }

    /// Delete the user's sessions whose token has expired. Unreadable
    /// expiry stamps count as expired.
    pub fn prune_expired_sessions(&self, user_id: &str) -> Result<usize, ServiceError> {
        let now = chrono::Utc::now();
        let query = Query::new().filter(Filter::eq("user_id", user_id));
        let (sessions, _) = self.store.query::<Session>(&query)?;
        let mut pruned = 0;
        for session in sessions {
            let expired = chrono::DateTime::parse_from_rfc3339(&session.expires_at)
                .map_or(true, |exp| exp <= now);
            if expired && self.store.remove::<Session>(&session.id)? {
                pruned += 1;
            }
        }
        if pruned > 0 {
            tracing::debug!(user_id, pruned, "expired sessions pruned");
        }
        Ok(pruned)
    }

    /// Revoke every open session of a user.
    pub fn revoke_user_sessions(&self, user_id: &str) -> Result<usize, ServiceError> {
        let query = Query::new()
            .filter(Filter::eq("user_id", user_id))
            .filter(Filter::eq("revoked", Value::bool(false)));
        let (sessions, _) = self.store.query::<Session>(&query)?;
        let count = sessions.len();
        for mut session in sessions {
            session.revoked = true;
            self.store.save(&session)?;
        }
        if count > 0 {
            tracing::info!(user_id, count, "revoked sessions");
        }
        Ok(count)
    }

    /// Change the signed-in user's own password.
    pub fn change_password(&self, principal: &Principal, input: ChangePassword) -> Result<(), ServiceError> {
        let mut record = self.store.fetch::<UserRecord>(&principal.user_id)?;
        if !verify_password(&input.current_password, &record.password_hash) {
            return Err(ServiceError::Validation("current password is incorrect".into()));
        }
        check_password_strength(&input.new_password)?;
        record.password_hash = hash_password(&input.new_password)?;
        record.user.updated_at = now_rfc3339();
        self.store.save(&record)?;
        self.activity.record(
            principal,
            Action::Update,
            "user",
            &principal.user_id,
            Some(serde_json::json!({ "fields": ["password"] })),
        );
        Ok(())
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.config.session_ttl_secs)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.config.cookie_name, value, max_age
        );
        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::service::testing::{admin, memory_service, new_user, sqlite_service};
    use crate::service::user::principal_of;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn login_issues_verifiable_token() {
        for svc in [memory_service(), sqlite_service()] {
            svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
            let resp = svc.login("ayse", "gizli123").unwrap();
            assert_eq!(resp.expires_in, 43200);
            assert!(resp.user.last_login_at.is_some());

            let claims = svc.verify_token(&resp.token).unwrap();
            assert_eq!(claims.sub, resp.user.id);
        }
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let svc = memory_service();
        svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
        assert!(matches!(svc.login("ayse", "yanlis"), Err(ServiceError::Unauthorized(_))));
        assert!(matches!(svc.login("nobody", "gizli123"), Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn inactive_user_is_forbidden() {
        let svc = memory_service();
        let mut input = new_user("ayse", "gizli123");
        input.active = Some(false);
        svc.create_user(&admin(), input).unwrap();
        assert!(matches!(
            svc.login("ayse", "gizli123"),
            Err(ServiceError::PermissionDenied(_))
        ));
    }

    #[test]
    fn login_prunes_expired_sessions() {
        for svc in [memory_service(), sqlite_service()] {
            let user = svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
            let live = svc.login("ayse", "gizli123").unwrap();
            let stale = Session {
                id: new_id(),
                user_id: user.id.clone(),
                issued_at: "2024-01-01T00:00:00+00:00".into(),
                expires_at: "2024-01-01T12:00:00+00:00".into(),
                revoked: false,
            };
            svc.store.create(&stale).unwrap();

            svc.login("ayse", "gizli123").unwrap();
            assert!(svc.store.find::<Session>(&stale.id).unwrap().is_none());
            assert!(svc.verify_token(&live.token).is_ok());
            let mine = [Filter::eq("user_id", user.id.as_str())];
            assert_eq!(svc.store.count_where::<Session>(&mine).unwrap(), 2);
        }
    }

    #[test]
    fn logout_revokes_session() {
        let svc = memory_service();
        svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
        let resp = svc.login("ayse", "gizli123").unwrap();

        svc.logout(&bearer(&resp.token)).unwrap();
        assert!(matches!(svc.verify_token(&resp.token), Err(ServiceError::Unauthorized(_))));

        // A second logout or a garbage token is harmless.
        svc.logout(&bearer(&resp.token)).unwrap();
        svc.logout(&bearer("garbage")).unwrap();
    }

    #[test]
    fn deactivation_revokes_sessions() {
        let svc = sqlite_service();
        let user = svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
        let resp = svc.login("ayse", "gizli123").unwrap();

        svc.update_user(&admin(), &user.id, serde_json::json!({"active": false})).unwrap();
        assert!(svc.verify_token(&resp.token).is_err());
    }

    #[test]
    fn change_password_checks_current() {
        let svc = memory_service();
        let user = svc.create_user(&admin(), new_user("ayse", "gizli123")).unwrap();
        let me = principal_of(&user);

        let wrong = ChangePassword {
            current_password: "yanlis".into(),
            new_password: "yenisifre".into(),
        };
        assert!(matches!(svc.change_password(&me, wrong), Err(ServiceError::Validation(_))));

        let ok = ChangePassword {
            current_password: "gizli123".into(),
            new_password: "yenisifre".into(),
        };
        svc.change_password(&me, ok).unwrap();
        assert!(svc.login("ayse", "yenisifre").is_ok());
    }

    #[test]
    fn token_prefers_bearer_over_cookie() {
        let mut headers = bearer("from-header");
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; kpidash_session=from-cookie"));
        assert_eq!(token_from_headers(&headers, "kpidash_session").as_deref(), Some("from-header"));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; kpidash_session=from-cookie"));
        assert_eq!(token_from_headers(&headers, "kpidash_session").as_deref(), Some("from-cookie"));

        assert_eq!(token_from_headers(&HeaderMap::new(), "kpidash_session"), None);
    }

    #[test]
    fn cookie_attributes() {
        let svc = memory_service();
        let cookie = svc.session_cookie("tok");
        assert_eq!(cookie, "kpidash_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=43200");
        assert!(svc.clear_cookie().contains("Max-Age=0"));
    }
}
