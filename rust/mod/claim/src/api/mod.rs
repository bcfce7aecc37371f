mod attachments;
mod claims;
mod comments;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{protect, protect_admin, Authenticator};

use crate::service::ClaimService;

pub use attachments::FILE_NAME_HEADER;

/// Shared application state.
pub type AppState = Arc<ClaimService>;

/// Build the claim router. Deleting a claim needs an admin; everything else
/// needs a signed-in user.
pub fn build_router(svc: Arc<ClaimService>, auth: Arc<dyn Authenticator>) -> Router {
    let signed_in = Router::new()
        .merge(claims::routes())
        .merge(comments::routes())
        .merge(attachments::routes());

    Router::new()
        .merge(protect(signed_in, auth.clone()))
        .merge(protect_admin(claims::admin_routes(), auth))
        .with_state(svc)
}
