//! Authentication seam shared by all modules.
//!
//! Modules never depend on the auth module directly. They receive an
//! `Arc<dyn Authenticator>` at startup and wrap their routers with
//! [`protect`] or [`protect_admin`]. Handlers read the signed-in user via
//! `Extension<Principal>`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Account role. Admins manage users, departments and stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    /// Lenient parse used by imports: accepts English and Turkish labels.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" | "yönetici" | "yonetici" => Some(Role::Admin),
            "manager" | "müdür" | "mudur" | "sorumlu" => Some(Role::Manager),
            "user" | "kullanıcı" | "kullanici" | "" => Some(Role::User),
            _ => None,
        }
    }
}

/// The signed-in user attached to every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub department: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Resolves request headers (session cookie or bearer token) to a principal.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError>;
}

/// Accepts every request as a fixed admin principal. Used in tests.
pub struct AllowAll;

impl AllowAll {
    pub fn principal() -> Principal {
        Principal {
            user_id: "test-admin".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            department: "Genel".to_string(),
        }
    }
}

impl Authenticator for AllowAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Ok(Self::principal())
    }
}

/// Rejects every request. Used in tests.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Err(ServiceError::Unauthorized("authentication required".into()))
    }
}

/// Middleware: authenticate and store the [`Principal`] as a request extension.
pub async fn require_auth(
    State(auth): State<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    match auth.authenticate(req.headers()) {
        Ok(principal) => {
            tracing::debug!(user = %principal.username, path = %req.uri().path(), "authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware: must run inside [`require_auth`]; rejects non-admin principals.
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<Principal>() {
        Some(p) if p.is_admin() => next.run(req).await,
        Some(p) => ServiceError::PermissionDenied(format!(
            "user '{}' is not an administrator",
            p.username
        ))
        .into_response(),
        None => ServiceError::Unauthorized("authentication required".into()).into_response(),
    }
}

/// Wrap every route of `router` with [`require_auth`].
pub fn protect<S>(router: Router<S>, auth: Arc<dyn Authenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, require_auth))
}

/// Wrap every route of `router` with [`require_auth`] followed by [`require_admin`].
pub fn protect_admin<S>(router: Router<S>, auth: Arc<dyn Authenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(auth, require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    struct FixedRole(Role);

    impl Authenticator for FixedRole {
        fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
            Ok(Principal {
                user_id: "u1".into(),
                username: "ayse".into(),
                role: self.0,
                department: "Kalite".into(),
            })
        }
    }

    async fn whoami(Extension(p): Extension<Principal>) -> String {
        p.username
    }

    async fn status_of(router: Router) -> StatusCode {
        let req = HttpRequest::builder().uri("/x").body(Body::empty()).unwrap();
        router.oneshot(req).await.unwrap().status()
    }

    #[test]
    fn role_parse_accepts_turkish_labels() {
        assert_eq!(Role::parse("Yönetici"), Some(Role::Admin));
        assert_eq!(Role::parse("kullanıcı"), Some(Role::User));
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("owner"), None);
    }

    #[tokio::test]
    async fn protect_inserts_principal() {
        let auth: Arc<dyn Authenticator> = Arc::new(FixedRole(Role::User));
        let router = protect(Router::new().route("/x", get(whoami)), auth);
        assert_eq!(status_of(router).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn protect_rejects_anonymous() {
        let auth: Arc<dyn Authenticator> = Arc::new(DenyAll);
        let router = protect(Router::new().route("/x", get(whoami)), auth);
        assert_eq!(status_of(router).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_layer_checks_role() {
        let user: Arc<dyn Authenticator> = Arc::new(FixedRole(Role::Manager));
        let router = protect_admin(Router::new().route("/x", get(whoami)), user);
        assert_eq!(status_of(router).await, StatusCode::FORBIDDEN);

        let admin: Arc<dyn Authenticator> = Arc::new(FixedRole(Role::Admin));
        let router = protect_admin(Router::new().route("/x", get(whoami)), admin);
        assert_eq!(status_of(router).await, StatusCode::OK);
    }
}
