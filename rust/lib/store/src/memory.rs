use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use kpidash_sql::Value;

use crate::error::StoreError;
use crate::query::{check_column, check_filters, compare, Filter, Page, Query};
use crate::schema::TableDef;
use crate::traits::RecordStore;

struct MemRow {
    /// Insertion sequence; stands in for SQLite's rowid when ordering ties.
    seq: u64,
    data: String,
    columns: HashMap<String, Value>,
}

impl MemRow {
    fn column(&self, name: &str) -> &Value {
        self.columns.get(name).unwrap_or(&Value::Null)
    }

    fn matches(&self, filters: &[Filter]) -> bool {
        filters.iter().all(|f| f.op.matches(self.column(f.column), &f.value))
    }
}

struct MemTable {
    def: TableDef,
    rows: BTreeMap<String, MemRow>,
    next_seq: u64,
}

impl MemTable {
    /// Reject a unique-column value already held by a different record.
    fn check_unique(&self, id: &str, columns: &HashMap<String, Value>) -> Result<(), StoreError> {
        for col in self.def.columns.iter().filter(|c| c.unique) {
            let Some(value) = columns.get(col.name) else { continue };
            if matches!(value, Value::Null) {
                continue;
            }
            let taken = self.rows.iter().any(|(other_id, row)| {
                other_id != id && compare(row.column(col.name), value) == Some(Ordering::Equal)
            });
            if taken {
                return Err(StoreError::Conflict(format!(
                    "UNIQUE constraint failed: {}.{}",
                    self.def.name, col.name
                )));
            }
        }
        Ok(())
    }

    fn check_columns(&self, columns: &[(&str, Value)]) -> Result<(), StoreError> {
        columns.iter().try_for_each(|(c, _)| check_column(&self.def, c))
    }
}

/// NULL sorts before everything else, as in SQLite.
fn order_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

/// RecordStore kept entirely in process memory.
///
/// Used when the SQL database cannot be opened and in tests. Implements the
/// same uniqueness, filtering and ordering rules as [`crate::SqlRecords`].
#[derive(Default)]
pub struct MemoryRecords {
    tables: RwLock<HashMap<String, MemTable>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, table: &str, f: impl FnOnce(&MemTable) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        f(t)
    }

    fn write<R>(&self, table: &str, f: impl FnOnce(&mut MemTable) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        f(t)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("memory store lock poisoned".into())
}

fn to_map(columns: &[(&str, Value)]) -> HashMap<String, Value> {
    columns.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

impl RecordStore for MemoryRecords {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn ensure_table(&self, table: &TableDef) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.entry(table.name.to_string()).or_insert_with(|| MemTable {
            def: *table,
            rows: BTreeMap::new(),
            next_seq: 0,
        });
        Ok(())
    }

    fn insert(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<(), StoreError> {
        self.write(table, |t| {
            t.check_columns(columns)?;
            if t.rows.contains_key(id) {
                return Err(StoreError::Conflict(format!(
                    "UNIQUE constraint failed: {}.id",
                    t.def.name
                )));
            }
            let columns = to_map(columns);
            t.check_unique(id, &columns)?;
            let seq = t.next_seq;
            t.next_seq += 1;
            t.rows.insert(
                id.to_string(),
                MemRow {
                    seq,
                    data: data.to_string(),
                    columns,
                },
            );
            Ok(())
        })
    }

    fn get(&self, table: &str, id: &str) -> Result<Option<String>, StoreError> {
        self.read(table, |t| Ok(t.rows.get(id).map(|r| r.data.clone())))
    }

    fn update(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<bool, StoreError> {
        self.write(table, |t| {
            t.check_columns(columns)?;
            let Some(existing) = t.rows.get(id) else {
                return Ok(false);
            };
            let mut merged = existing.columns.clone();
            merged.extend(to_map(columns));
            t.check_unique(id, &merged)?;

            if let Some(row) = t.rows.get_mut(id) {
                row.data = data.to_string();
                row.columns = merged;
            }
            Ok(true)
        })
    }

    fn delete(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        self.write(table, |t| Ok(t.rows.remove(id).is_some()))
    }

    fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.write(table, |t| {
            check_filters(&t.def, filters)?;
            let before = t.rows.len();
            t.rows.retain(|_, row| !row.matches(filters));
            Ok((before - t.rows.len()) as u64)
        })
    }

    fn list(&self, table: &str, query: &Query) -> Result<Page, StoreError> {
        self.read(table, |t| {
            query.validate(&t.def)?;

            let mut hits: Vec<&MemRow> = t.rows.values().filter(|r| r.matches(&query.filters)).collect();
            hits.sort_by(|a, b| {
                let ord = order_values(a.column(query.order_by), b.column(query.order_by))
                    .then(a.seq.cmp(&b.seq));
                if query.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });

            let total = hits.len();
            let rows = hits
                .into_iter()
                .skip(query.offset)
                .take(query.limit.unwrap_or(usize::MAX))
                .map(|r| r.data.clone())
                .collect();
            Ok(Page { rows, total })
        })
    }

    fn count(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        self.read(table, |t| {
            check_filters(&t.def, filters)?;
            Ok(t.rows.values().filter(|r| r.matches(filters)).count())
        })
    }
}
