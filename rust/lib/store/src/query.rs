use std::cmp::Ordering;

use kpidash_sql::Value;

use crate::error::StoreError;
use crate::schema::TableDef;

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

impl Op {
    pub fn sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lte => "<=",
        }
    }

    /// Whether `left op right` holds. Comparisons against NULL never match.
    pub fn matches(&self, left: &Value, right: &Value) -> bool {
        match compare(left, right) {
            Some(ord) => match self {
                Op::Eq => ord == Ordering::Equal,
                Op::Gte => ord != Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
            },
            None => false,
        }
    }
}

/// Compare two column values the way SQLite does for same-affinity columns.
/// Returns None when either side is NULL or the types are incomparable.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Real(b)) => (*a as f64).partial_cmp(b),
        (Value::Real(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self { column, op: Op::Eq, value: value.into() }
    }

    pub fn gte(column: &'static str, value: impl Into<Value>) -> Self {
        Self { column, op: Op::Gte, value: value.into() }
    }

    pub fn lte(column: &'static str, value: impl Into<Value>) -> Self {
        Self { column, op: Op::Lte, value: value.into() }
    }
}

/// Filtered, ordered and paged listing. Defaults to newest first, no limit.
#[derive(Debug, Clone)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: &'static str,
    pub descending: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: "created_at",
            descending: true,
            limit: None,
            offset: 0,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an equality filter when `value` is present.
    pub fn eq_opt(self, column: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.filter(Filter::eq(column, v)),
            None => self,
        }
    }

    pub fn order_by(mut self, column: &'static str, descending: bool) -> Self {
        self.order_by = column;
        self.descending = descending;
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Ensure every referenced column exists in `table`.
    pub(crate) fn validate(&self, table: &TableDef) -> Result<(), StoreError> {
        check_filters(table, &self.filters)?;
        check_column(table, self.order_by)
    }
}

pub(crate) fn check_column(table: &TableDef, column: &str) -> Result<(), StoreError> {
    if table.column(column).is_none() {
        return Err(StoreError::UnknownColumn {
            table: table.name.to_string(),
            column: column.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_filters(table: &TableDef, filters: &[Filter]) -> Result<(), StoreError> {
    filters.iter().try_for_each(|f| check_column(table, f.column))
}

/// One page of JSON documents plus the total number of matches.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<String>,
    pub total: usize,
}
