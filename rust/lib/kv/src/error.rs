use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<KVError> for kpidash_core::ServiceError {
    fn from(e: KVError) -> Self {
        kpidash_core::ServiceError::Storage(e.to_string())
    }
}
