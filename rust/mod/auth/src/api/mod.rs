mod activity;
mod departments;
mod session;
mod users;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{protect, protect_admin, Authenticator};

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth router with absolute `/api/...` paths.
///
/// Login is public; account and read routes need a session; user management
/// and department writes need an admin.
pub fn build_router(svc: Arc<AuthService>, auth: Arc<dyn Authenticator>) -> Router {
    let signed_in = Router::new()
        .merge(session::routes())
        .merge(departments::routes())
        .merge(activity::routes());

    let admin = Router::new()
        .merge(users::routes())
        .merge(departments::admin_routes());

    Router::new()
        .merge(session::public_routes())
        .merge(protect(signed_in, auth.clone()))
        .merge(protect_admin(admin, auth))
        .with_state(svc)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::authenticator::SessionAuthenticator;
    use crate::service::testing::memory_service;
    use crate::store_impls::hash_password;

    fn router() -> Router {
        let svc = memory_service();
        let hash = hash_password("yonetici1").unwrap();
        svc.ensure_admin("admin", &hash).unwrap();
        let auth: Arc<dyn Authenticator> = Arc::new(SessionAuthenticator::new(svc.clone()));
        build_router(svc, auth)
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
        (status, json)
    }

    async fn login(router: &Router, username: &str, password: &str) -> String {
        let (status, body) = call(
            router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn login_sets_cookie_and_me_works() {
        let router = router();
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin","password":"yonetici1"}"#))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("kpidash_session="));
        assert!(cookie.contains("HttpOnly"));

        // The cookie alone authenticates.
        let pair = cookie.split(';').next().unwrap().to_string();
        let req = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_is_401_with_error_body() {
        let router = router();
        let (status, body) = call(
            &router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "admin", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn anonymous_requests_are_rejected() {
        let router = router();
        let (status, _) = call(&router, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&router, "GET", "/api/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_management_requires_admin() {
        let router = router();
        let admin = login(&router, "admin", "yonetici1").await;

        let (status, created) = call(
            &router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({"username": "ayse", "password": "gizli123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("password_hash").is_none());

        let user = login(&router, "ayse", "gizli123").await;
        let (status, body) = call(&router, "GET", "/api/users", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "PERMISSION_DENIED");

        // Regular users can still read departments but not write them.
        let (status, _) = call(&router, "GET", "/api/departments", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&router, "POST", "/api/departments", Some(&user), Some(json!({"name": "Kalite"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&router, "POST", "/api/departments", Some(&admin), Some(json!({"name": "Kalite"}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = call(&router, "GET", "/api/users?limit=1", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 2);
        assert_eq!(list["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let router = router();
        let token = login(&router, "admin", "yonetici1").await;

        let (status, _) = call(&router, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&router, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deactivated_user_loses_access() {
        let router = router();
        let admin = login(&router, "admin", "yonetici1").await;
        let (_, created) = call(
            &router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({"username": "mehmet", "password": "gizli123"})),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();
        let token = login(&router, "mehmet", "gizli123").await;

        let (status, _) = call(&router, "PUT", &format!("/api/users/{}", id), Some(&admin), Some(json!({"active": false}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&router, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = call(
            &router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "mehmet", "password": "gizli123"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
    }

    #[tokio::test]
    async fn import_and_activity_feed() {
        let router = router();
        let admin = login(&router, "admin", "yonetici1").await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/users/import")
            .header(header::AUTHORIZATION, format!("Bearer {}", admin))
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from("Kullanıcı Adı;Şifre\nzeynep;gizli123\n"))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["created"], 1);

        let (status, feed) = call(&router, "GET", "/api/activity?entity_type=user", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let actions: Vec<&str> = feed["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["action"].as_str())
            .collect();
        assert!(actions.contains(&"import"));
        assert!(actions.contains(&"login"));
    }
}
