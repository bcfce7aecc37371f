use std::sync::Arc;

use axum::http::HeaderMap;

use kpidash_core::{Authenticator, Principal, ServiceError};
use kpidash_store::RecordStoreExt;

use crate::model::UserRecord;
use crate::service::session::token_from_headers;
use crate::service::user::principal_of;
use crate::service::AuthService;

/// Resolves the session cookie or bearer token to the stored user.
///
/// The role and department come from the user record, not the token, so
/// changes made by an admin apply on the next request.
pub struct SessionAuthenticator {
    svc: Arc<AuthService>,
}

impl SessionAuthenticator {
    pub fn new(svc: Arc<AuthService>) -> Self {
        Self { svc }
    }
}

impl Authenticator for SessionAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError> {
        let token = token_from_headers(headers, &self.svc.config.cookie_name)
            .ok_or_else(|| ServiceError::Unauthorized("authentication required".into()))?;
        let claims = self.svc.verify_token(&token)?;

        let record = self
            .svc
            .store
            .find::<UserRecord>(&claims.sub)?
            .ok_or_else(|| ServiceError::Unauthorized("user no longer exists".into()))?;
        if !record.user.active {
            return Err(ServiceError::Unauthorized("user is deactivated".into()));
        }
        Ok(principal_of(&record.user))
    }
}
