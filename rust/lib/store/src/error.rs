use kpidash_core::ServiceError;
use kpidash_sql::SQLError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// Duplicate id or unique column value.
    #[error("{0}")]
    Conflict(String),

    #[error("serialization: {0}")]
    Serialization(String),

    #[error("backend: {0}")]
    Backend(String),
}

impl From<SQLError> for StoreError {
    fn from(e: SQLError) -> Self {
        match e {
            SQLError::Constraint(msg) => StoreError::Conflict(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Backend(msg) => ServiceError::Storage(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
