//! HTTP client for the kpidash REST API.
//!
//! Wraps reqwest with Bearer authentication, `{code, message}` error
//! decoding and a [`QueryCache`] for GET responses. Every successful
//! mutation invalidates the cached entries of the collection it touched.
//!
//! # Usage
//!
//! ```ignore
//! use kpidash_client::ApiClient;
//!
//! let client = ApiClient::new("http://localhost:8080");
//! client.login("admin", "secret").await?;
//! let kpis: serde_json::Value = client.get("/api/kpis?department=Kalite").await?;
//! ```

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;

pub use cache::{affected_collections, collection_of, QueryCache};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, code: Option<String>, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: String,
}

/// Build a `Server` error from a response body, which is `{code, message}`
/// when the server produced it and arbitrary text otherwise.
fn server_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => ApiError::Server { status, code: e.code, message: e.message },
        Err(_) => ApiError::Server { status, code: None, message: body.to_string() },
    }
}

// ── TokenSource ─────────────────────────────────────────────────────

/// Supplies the Bearer token for each request. `Ok(None)` sends none.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A token obtained elsewhere, e.g. from a previous login.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: serde_json::Value,
}

async fn login_request(
    http: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    let resp = http
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(match server_error(status.as_u16(), &body) {
            ApiError::Server { message, .. } => {
                ApiError::Auth(format!("login failed ({}): {}", status.as_u16(), message))
            }
            other => other,
        });
    }
    resp.json()
        .await
        .map_err(|e| ApiError::Decode(format!("login response: {}", e)))
}

/// Password login for unattended clients. Logs in lazily, caches the token
/// and logs in again shortly before it expires.
pub struct PasswordLogin {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    cached: RwLock<Option<(String, i64)>>,
}

impl PasswordLogin {
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            cached: RwLock::new(None),
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for PasswordLogin {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        let now = chrono::Utc::now().timestamp();
        if let Some((token, expires_at)) = &*self.cached.read().await {
            if now < *expires_at {
                return Ok(Some(token.clone()));
            }
        }

        let mut guard = self.cached.write().await;
        if let Some((token, expires_at)) = &*guard {
            if now < *expires_at {
                return Ok(Some(token.clone()));
            }
        }
        let lr = login_request(&self.http, &self.base_url, &self.username, &self.password).await?;
        let expires_at = now + lr.expires_in as i64 - 30;
        *guard = Some((lr.token.clone(), expires_at));
        Ok(Some(lr.token))
    }
}

// ── ApiClient ───────────────────────────────────────────────────────

const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token_source: RwLock<Arc<dyn TokenSource>>,
    cache: QueryCache,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source: RwLock::new(Arc::new(NoAuth)),
            cache: QueryCache::new(DEFAULT_STALE_TIME),
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.cache = QueryCache::new(stale_time);
        self
    }

    pub fn with_token_source(self, source: Arc<dyn TokenSource>) -> Self {
        Self {
            token_source: RwLock::new(source),
            ..self
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Log in and use the returned token for subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let lr = login_request(&self.http, &self.base_url, username, password).await?;
        *self.token_source.write().await = Arc::new(StaticToken::new(lr.token.clone()));
        self.cache.clear();
        tracing::debug!(username, "logged in");
        Ok(lr)
    }

    /// Revoke the session server-side and drop the token.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let req = self.http.post(self.url("/api/auth/logout"));
        let resp = self.authed(req).await?.send().await?;
        *self.token_source.write().await = Arc::new(NoAuth);
        self.cache.clear();
        Self::check(resp).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        let source = self.token_source.read().await.clone();
        match source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }

    /// JSON body of a successful response; 204 decodes as `null`.
    async fn body(resp: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let resp = Self::check(resp).await?;
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(serde_json::Value::Null);
        }
        resp.json()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn after_mutation(&self, path: &str) {
        let removed = affected_collections(path)
            .iter()
            .map(|c| self.cache.invalidate_prefix(c))
            .sum::<usize>()
            + self.cache.invalidate_prefix("/api/activity")
            + self.cache.invalidate_prefix("/api/dashboard/summary");
        tracing::debug!(path, removed, "cache invalidated");
    }

    /// GET through the cache.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        if let Some(hit) = self.cache.get(path) {
            return Self::decode(hit);
        }
        let req = self.http.get(self.url(path));
        let value = Self::body(self.authed(req).await?.send().await?).await?;
        self.cache.insert(path, value.clone());
        Self::decode(value)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self.http.post(self.url(path)).json(body);
        let value = Self::body(self.authed(req).await?.send().await?).await?;
        self.after_mutation(path);
        Self::decode(value)
    }

    /// POST a raw body, used for CSV imports and attachment uploads.
    pub async fn post_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut req = self
            .http
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(name) = file_name {
            req = req.header("x-file-name", name);
        }
        let value = Self::body(self.authed(req).await?.send().await?).await?;
        self.after_mutation(path);
        Self::decode(value)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self.http.put(self.url(path)).json(body);
        let value = Self::body(self.authed(req).await?.send().await?).await?;
        self.after_mutation(path);
        Self::decode(value)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.http.delete(self.url(path));
        Self::check(self.authed(req).await?.send().await?).await?;
        self.after_mutation(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_auth_returns_none() {
        assert!(NoAuth.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("jwt");
        assert_eq!(ts.token().await.unwrap(), Some("jwt".to_string()));
    }

    #[test]
    fn server_error_reads_code_and_message() {
        match server_error(409, r#"{"code":"ALREADY_EXISTS","message":"station code taken"}"#) {
            ApiError::Server { status, code, message } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("ALREADY_EXISTS"));
                assert_eq!(message, "station code taken");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn server_error_keeps_plain_text() {
        match server_error(502, "Bad Gateway") {
            ApiError::Server { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn mutation_invalidates_collection_and_activity() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let cache = client.cache();
        cache.insert("/api/claims", serde_json::json!([]));
        cache.insert("/api/claims/c1", serde_json::json!({}));
        cache.insert("/api/activity?limit=20", serde_json::json!([]));
        cache.insert("/api/kpis", serde_json::json!([]));

        client.after_mutation("/api/claims/c1/comments");
        assert!(cache.get("/api/claims").is_none());
        assert!(cache.get("/api/claims/c1").is_none());
        assert!(cache.get("/api/activity?limit=20").is_none());
        assert!(cache.get("/api/kpis").is_some());
    }

    #[tokio::test]
    async fn child_route_mutation_invalidates_parent_lists() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let cache = client.cache();
        cache.insert("/api/claims/c1/comments", serde_json::json!([]));
        cache.insert("/api/claims/c1/attachments", serde_json::json!([]));
        cache.insert("/api/stations/s1/entries", serde_json::json!([]));
        cache.insert("/api/stations/s1/kpis", serde_json::json!([]));

        client.after_mutation("/api/claim-comments/m1");
        assert!(cache.get("/api/claims/c1/comments").is_none());
        assert!(cache.get("/api/stations/s1/entries").is_some());

        cache.insert("/api/claims/c1/attachments", serde_json::json!([]));
        client.after_mutation("/api/attachments/a1");
        assert!(cache.get("/api/claims/c1/attachments").is_none());

        client.after_mutation("/api/station-entries/e1");
        assert!(cache.get("/api/stations/s1/entries").is_none());

        cache.insert("/api/stations/s1/kpis", serde_json::json!([]));
        client.after_mutation("/api/station-kpis/k1");
        assert!(cache.get("/api/stations/s1/kpis").is_none());
    }

    #[tokio::test]
    async fn cached_get_skips_the_network() {
        // Nothing listens on port 9; a cache hit must not try to connect.
        let client = ApiClient::new("http://127.0.0.1:9/");
        client
            .cache()
            .insert("/api/departments", serde_json::json!({"items": [{"name": "Kalite"}], "total": 1}));
        let v: serde_json::Value = client.get("/api/departments").await.unwrap();
        assert_eq!(v["total"], 1);
    }
}
