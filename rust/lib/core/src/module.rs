use axum::Router;

/// A business module that contributes HTTP routes.
///
/// Each module (auth, kpi, station, claim) registers its `/api/...` endpoints
/// and applies its own authentication layers. The server binary merges them
/// into one router.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// The module's routes with absolute `/api/...` paths.
    fn routes(&self) -> Router;
}
