pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{
    protect, protect_admin, require_admin, require_auth, AllowAll, Authenticator, DenyAll,
    Principal, Role,
};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use types::{
    department_or_default, merge_patch, new_id, now_rfc3339, parse_date, percentage, today,
    ListParams, ListResult, MAX_LIST_LIMIT,
};
