use kpidash_core::ServiceError;
use kpidash_sql::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::query::{Filter, Query};
use crate::schema::TableDef;
use crate::traits::RecordStore;

/// An entity persisted through a [`RecordStore`].
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: TableDef;

    /// Human-readable kind used in "not found" messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Values for the extracted columns declared in [`Record::TABLE`].
    fn columns(&self) -> Vec<(&'static str, Value)>;
}

fn decode<T: Record>(data: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(data)?)
}

/// Typed access on top of any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    fn ensure<T: Record>(&self) -> Result<(), StoreError> {
        self.ensure_table(&T::TABLE)
    }

    fn create<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let data = serde_json::to_string(record)?;
        self.insert(T::TABLE.name, record.id(), &data, &record.columns())
    }

    fn find<T: Record>(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.get(T::TABLE.name, id)?.map(|d| decode(&d)).transpose()
    }

    /// Like [`find`](Self::find) but a missing record is a `NotFound` error.
    fn fetch<T: Record>(&self, id: &str) -> Result<T, ServiceError> {
        self.find::<T>(id)?
            .ok_or_else(|| ServiceError::not_found(T::KIND, id))
    }

    /// Replace a stored record. Returns false when it no longer exists.
    fn save<T: Record>(&self, record: &T) -> Result<bool, StoreError> {
        let data = serde_json::to_string(record)?;
        self.update(T::TABLE.name, record.id(), &data, &record.columns())
    }

    fn remove<T: Record>(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(T::TABLE.name, id)
    }

    fn remove_where<T: Record>(&self, filters: &[Filter]) -> Result<u64, StoreError> {
        self.delete_where(T::TABLE.name, filters)
    }

    /// Matching records for the requested page, plus the total match count.
    fn query<T: Record>(&self, query: &Query) -> Result<(Vec<T>, usize), StoreError> {
        let page = self.list(T::TABLE.name, query)?;
        let items = page
            .rows
            .iter()
            .map(|d| decode::<T>(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, page.total))
    }

    fn count_where<T: Record>(&self, filters: &[Filter]) -> Result<usize, StoreError> {
        self.count(T::TABLE.name, filters)
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
