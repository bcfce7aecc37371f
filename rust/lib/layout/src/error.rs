use kpidash_core::ServiceError;
use kpidash_kv::KVError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("widget '{0}' not found")]
    UnknownWidget(String),

    #[error("invalid layout: {0}")]
    Invalid(String),

    #[error("unsupported layout version {0}")]
    UnsupportedVersion(u32),

    #[error("layout storage: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::Invalid(e.to_string())
    }
}

impl From<KVError> for LayoutError {
    fn from(e: KVError) -> Self {
        LayoutError::Storage(e.to_string())
    }
}

impl From<LayoutError> for ServiceError {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::UnknownWidget(id) => ServiceError::not_found("widget", &id),
            LayoutError::Invalid(_) | LayoutError::UnsupportedVersion(_) => {
                ServiceError::Validation(e.to_string())
            }
            LayoutError::Storage(msg) => ServiceError::Storage(msg),
        }
    }
}
