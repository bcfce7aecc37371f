use kpidash_core::ServiceError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ImportError {
    #[error("file contains no data")]
    Empty,

    #[error("need at least {needed} columns, found {found}")]
    NotEnoughColumns { needed: usize, found: usize },

    #[error("missing column: {0}")]
    MissingColumn(String),
}

impl From<ImportError> for ServiceError {
    fn from(e: ImportError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}
