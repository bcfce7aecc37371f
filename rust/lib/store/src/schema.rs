/// SQL affinity of an extracted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
        }
    }
}

/// A column extracted from the JSON document for filtering or uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub unique: bool,
    pub indexed: bool,
}

impl ColumnDef {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text, unique: false, indexed: false }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer, unique: false, indexed: false }
    }

    pub const fn real(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Real, unique: false, indexed: false }
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// A table: implicit `id` primary key and `data` JSON column, plus `columns`.
///
/// Every table must declare a `created_at` column; it is the default sort key.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// `CREATE TABLE IF NOT EXISTS` plus one index statement per unique/indexed column.
    pub fn ddl(&self) -> String {
        let mut cols = vec![
            "id TEXT PRIMARY KEY".to_string(),
            "data TEXT NOT NULL".to_string(),
        ];
        for c in self.columns {
            cols.push(format!("\"{}\" {}", c.name, c.kind.sql_type()));
        }

        let mut stmts = vec![format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            self.name,
            cols.join(", ")
        )];
        for c in self.columns {
            if c.unique {
                stmts.push(format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_{t}_{c}\" ON \"{t}\" (\"{c}\")",
                    t = self.name,
                    c = c.name
                ));
            } else if c.indexed {
                stmts.push(format!(
                    "CREATE INDEX IF NOT EXISTS \"idx_{t}_{c}\" ON \"{t}\" (\"{c}\")",
                    t = self.name,
                    c = c.name
                ));
            }
        }
        stmts.join(";\n") + ";"
    }
}
