use kpidash_sql::Value;

use crate::error::StoreError;
use crate::query::{Filter, Page, Query};
use crate::schema::TableDef;

/// Storage interface for JSON records with extracted columns.
///
/// Adapters must agree on semantics:
/// - `insert` fails with [`StoreError::Conflict`] on a duplicate id or unique value.
/// - `update` replaces the document and the given columns, leaving other columns as they were.
/// - `list` applies filters, orders by `query.order_by` (ties: most recently
///   inserted first when descending), then pages.
/// - Referencing an unregistered table or column is an error.
pub trait RecordStore: Send + Sync {
    /// Adapter name for logs and `/health`.
    fn backend(&self) -> &'static str;

    /// Register (and create if needed) a table. Idempotent.
    fn ensure_table(&self, table: &TableDef) -> Result<(), StoreError>;

    fn insert(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<(), StoreError>;

    fn get(&self, table: &str, id: &str) -> Result<Option<String>, StoreError>;

    /// Returns false when no record has this id.
    fn update(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<bool, StoreError>;

    /// Returns false when no record has this id.
    fn delete(&self, table: &str, id: &str) -> Result<bool, StoreError>;

    /// Delete every record matching all filters. Returns the number removed.
    fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    fn list(&self, table: &str, query: &Query) -> Result<Page, StoreError>;

    fn count(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError>;
}
