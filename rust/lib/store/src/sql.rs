use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use kpidash_sql::{SQLStore, Value};

use crate::error::StoreError;
use crate::query::{check_column, check_filters, Filter, Page, Query};
use crate::schema::TableDef;
use crate::traits::RecordStore;

/// RecordStore over an embedded SQL database.
///
/// Each table holds `id`, the JSON `data` document and the declared columns.
pub struct SqlRecords {
    sql: Arc<dyn SQLStore>,
    tables: RwLock<HashMap<&'static str, TableDef>>,
}

impl SqlRecords {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self {
            sql,
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn table(&self, name: &str) -> Result<TableDef, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("table registry lock poisoned".into()))?;
        tables
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn check_columns(table: &TableDef, columns: &[(&str, Value)]) -> Result<(), StoreError> {
        columns.iter().try_for_each(|(c, _)| check_column(table, c))
    }
}

/// Build ` WHERE a = ?1 AND b >= ?2` starting at parameter index `first`.
fn where_clause(filters: &[Filter], first: usize) -> (String, Vec<Value>) {
    if filters.is_empty() {
        return (String::new(), Vec::new());
    }
    let mut clauses = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for (i, f) in filters.iter().enumerate() {
        clauses.push(format!("\"{}\" {} ?{}", f.column, f.op.sql(), first + i));
        params.push(f.value.clone());
    }
    (format!(" WHERE {}", clauses.join(" AND ")), params)
}

impl RecordStore for SqlRecords {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn ensure_table(&self, table: &TableDef) -> Result<(), StoreError> {
        self.sql.exec_batch(&table.ddl())?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("table registry lock poisoned".into()))?;
        tables.insert(table.name, *table);
        tracing::debug!(table = table.name, "sql table ready");
        Ok(())
    }

    fn insert(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<(), StoreError> {
        let def = self.table(table)?;
        Self::check_columns(&def, columns)?;

        let mut cols = vec!["id".to_string(), "data".to_string()];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(data.to_string())];
        for (i, (col, val)) in columns.iter().enumerate() {
            cols.push(format!("\"{}\"", col));
            placeholders.push(format!("?{}", i + 3));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            def.name,
            cols.join(", "),
            placeholders.join(", "),
        );
        self.sql.exec(&sql, &params)?;
        Ok(())
    }

    fn get(&self, table: &str, id: &str) -> Result<Option<String>, StoreError> {
        let def = self.table(table)?;
        let sql = format!("SELECT data FROM \"{}\" WHERE id = ?1", def.name);
        let rows = self.sql.query(&sql, &[Value::Text(id.to_string())])?;
        Ok(rows.first().and_then(|r| r.get_str("data")).map(str::to_string))
    }

    fn update(&self, table: &str, id: &str, data: &str, columns: &[(&str, Value)]) -> Result<bool, StoreError> {
        let def = self.table(table)?;
        Self::check_columns(&def, columns)?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params = vec![Value::Text(data.to_string())];
        for (i, (col, val)) in columns.iter().enumerate() {
            sets.push(format!("\"{}\" = ?{}", col, i + 2));
            params.push(val.clone());
        }
        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE id = ?{}",
            def.name,
            sets.join(", "),
            id_idx,
        );
        Ok(self.sql.exec(&sql, &params)? > 0)
    }

    fn delete(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        let def = self.table(table)?;
        let sql = format!("DELETE FROM \"{}\" WHERE id = ?1", def.name);
        Ok(self.sql.exec(&sql, &[Value::Text(id.to_string())])? > 0)
    }

    fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let def = self.table(table)?;
        check_filters(&def, filters)?;
        let (where_sql, params) = where_clause(filters, 1);
        let sql = format!("DELETE FROM \"{}\"{}", def.name, where_sql);
        Ok(self.sql.exec(&sql, &params)?)
    }

    fn list(&self, table: &str, query: &Query) -> Result<Page, StoreError> {
        let def = self.table(table)?;
        query.validate(&def)?;

        let total = self.count(table, &query.filters)?;

        let (where_sql, mut params) = where_clause(&query.filters, 1);
        let dir = if query.descending { "DESC" } else { "ASC" };
        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(query.limit.map(|l| l as i64).unwrap_or(-1)));
        params.push(Value::Integer(query.offset as i64));

        let sql = format!(
            "SELECT data FROM \"{}\"{} ORDER BY \"{}\" {dir}, rowid {dir} LIMIT ?{} OFFSET ?{}",
            def.name, where_sql, query.order_by, limit_idx, offset_idx,
        );
        let rows = self.sql.query(&sql, &params)?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| StoreError::Backend(format!("{}: missing data column", def.name)))?;
            docs.push(data.to_string());
        }
        Ok(Page { rows: docs, total })
    }

    fn count(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        let def = self.table(table)?;
        check_filters(&def, filters)?;
        let (where_sql, params) = where_clause(filters, 1);
        let sql = format!("SELECT COUNT(*) AS cnt FROM \"{}\"{}", def.name, where_sql);
        let rows = self.sql.query(&sql, &params)?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Op;

    #[test]
    fn where_clause_numbers_params_from_offset() {
        let filters = vec![
            Filter::eq("department", "Kalite"),
            Filter { column: "period", op: Op::Gte, value: Value::from("2024-01-01") },
        ];
        let (sql, params) = where_clause(&filters, 3);
        assert_eq!(sql, " WHERE \"department\" = ?3 AND \"period\" >= ?4");
        assert_eq!(params.len(), 2);
    }
}
