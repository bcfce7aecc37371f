use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),
}

impl From<BlobError> for kpidash_core::ServiceError {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::InvalidKey(_) => kpidash_core::ServiceError::Validation(e.to_string()),
            BlobError::Io(_) => kpidash_core::ServiceError::Storage(e.to_string()),
        }
    }
}
