//! SQLite storage implementation

use super::schema;
use crate::registry::EntityDefinition;
use crate::rules::Access;
use crate::{Error, Result};
use rusqlite::types::{Value, ValueRef};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;

/// One fetched record: its primary key plus the selected columns
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: i64,
    pub values: BTreeMap<String, serde_json::Value>,
}

impl Row {
    /// Column value rendered as text; `None` for null or missing columns
    pub fn text(&self, column: &str) -> Option<String> {
        match self.values.get(column)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// SQLite-backed storage for business records
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    ///
    /// `REFERENCES` clauses only document links: foreign-key enforcement is
    /// switched off so rows with dangling ids load and read like any other.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = OFF")?;
        self.register_functions()?;

        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// `casefold(text)`: Unicode lowercase, used for case-insensitive search
    /// (SQLite's own `LIKE` only folds ASCII)
    fn register_functions(&self) -> Result<()> {
        self.conn.create_scalar_function(
            "casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let folded = match ctx.get_raw(0) {
                    ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
                    ValueRef::Integer(i) => Some(i.to_string()),
                    ValueRef::Real(f) => Some(f.to_string()),
                    ValueRef::Null | ValueRef::Blob(_) => None,
                };
                Ok(folded)
            },
        )?;
        Ok(())
    }

    /// Run raw SQL statements (maintenance, ad-hoc fixes)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    // ========== Read Operations ==========

    /// Point lookup by primary key
    pub fn fetch_by_id(&self, def: &EntityDefinition, id: i64) -> Result<Option<Row>> {
        let columns = def.columns();
        let sql = format!(
            "SELECT {} FROM {} t WHERE t.id = ?1",
            select_list(&columns),
            def.table
        );

        self.conn
            .query_row(&sql, [id], |row| read_row(row, &columns))
            .optional()
            .map_err(Into::into)
    }

    /// Fetch the rows of `target` linked to a `subject` row through `access`
    ///
    /// Rows come back ordered by id and capped at `limit`.
    pub fn fetch_related(
        &self,
        target: &EntityDefinition,
        subject: &EntityDefinition,
        access: &Access,
        subject_id: i64,
        limit: usize,
    ) -> Result<Vec<Row>> {
        let columns = target.columns();
        let select = select_list(&columns);

        let sql = match *access {
            Access::ForeignKey { column } => format!(
                "SELECT {select} FROM {target} t WHERE t.{column} = ?1 ORDER BY t.id LIMIT ?2",
                target = target.table,
            ),
            Access::ParentKey { column } => format!(
                "SELECT {select} FROM {target} t JOIN {subject} s ON s.{column} = t.id \
                 WHERE s.id = ?1 ORDER BY t.id LIMIT ?2",
                target = target.table,
                subject = subject.table,
            ),
            Access::JoinTable { table, subject_column, target_column } => format!(
                "SELECT {select} FROM {target} t JOIN {table} j ON j.{target_column} = t.id \
                 WHERE j.{subject_column} = ?1 ORDER BY t.id LIMIT ?2",
                target = target.table,
            ),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![subject_id, limit as i64], |row| read_row(row, &columns))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Case-insensitive substring search over the definition's searchable fields
    ///
    /// A blank query matches every row. A type without searchable fields never
    /// matches a non-blank query.
    pub fn search(&self, def: &EntityDefinition, query: Option<&str>, limit: usize, offset: usize) -> Result<Vec<Row>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        if query.is_some() && def.searchable_fields.is_empty() {
            return Ok(Vec::new());
        }

        let columns = def.columns();
        let select = select_list(&columns);

        let rows = match query {
            Some(q) => {
                let predicate = def
                    .searchable_fields
                    .iter()
                    .map(|field| format!("casefold(t.{}) LIKE ?1 ESCAPE '\\'", field))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                let sql = format!(
                    "SELECT {select} FROM {table} t WHERE ({predicate}) ORDER BY t.id LIMIT ?2 OFFSET ?3",
                    table = def.table,
                );
                let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params![pattern, limit as i64, offset as i64], |row| read_row(row, &columns))?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {select} FROM {table} t ORDER BY t.id LIMIT ?1 OFFSET ?2",
                    table = def.table,
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params![limit as i64, offset as i64], |row| read_row(row, &columns))?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(rows)
    }

    /// Count rows in a known table
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        if !schema::is_known_table(table) {
            return Err(Error::Validation(format!("Unknown table: {}", table)));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get per-table row counts
    pub fn stats(&self) -> Result<DbStats> {
        let mut tables = Vec::with_capacity(schema::TABLES.len());
        for table in schema::TABLES {
            tables.push((table.to_string(), self.count_rows(table)?));
        }
        Ok(DbStats { tables })
    }

    // ========== Write Operations ==========

    /// Insert one row into a known table, returning its rowid
    pub fn insert_row(&self, table: &str, row: &serde_json::Map<String, serde_json::Value>) -> Result<i64> {
        if !schema::is_known_table(table) {
            return Err(Error::Validation(format!("Unknown table: {}", table)));
        }
        if row.is_empty() {
            return Err(Error::Validation(format!("Empty row for table {}", table)));
        }
        if let Some(bad) = row.keys().find(|column| !is_identifier(column)) {
            return Err(Error::Validation(format!("Invalid column name: {}", bad)));
        }

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<Value> = row.values().map(json_to_sql).collect();

        self.conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Load `{ "<table>": [ {row}, ... ], ... }` in one transaction
    ///
    /// Tables are inserted in schema dependency order regardless of their
    /// order in the document. Returns the number of rows inserted.
    pub fn import_json(&mut self, document: &serde_json::Value) -> Result<usize> {
        let tables = document
            .as_object()
            .ok_or_else(|| Error::Validation("Import document must be a JSON object".to_string()))?;

        if let Some(unknown) = tables.keys().find(|t| !schema::is_known_table(t)) {
            return Err(Error::Validation(format!("Unknown table: {}", unknown)));
        }

        self.begin_transaction()?;
        match self.import_tables(tables) {
            Ok(count) => {
                self.commit()?;
                Ok(count)
            }
            Err(err) => {
                self.rollback()?;
                Err(err)
            }
        }
    }

    fn import_tables(&self, tables: &serde_json::Map<String, serde_json::Value>) -> Result<usize> {
        let mut inserted = 0;
        for table in schema::TABLES {
            let Some(rows) = tables.get(*table) else { continue };
            let rows = rows
                .as_array()
                .ok_or_else(|| Error::Validation(format!("Rows for {} must be an array", table)))?;

            for row in rows {
                let row = row
                    .as_object()
                    .ok_or_else(|| Error::Validation(format!("Row in {} must be an object", table)))?;
                self.insert_row(table, row)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }
}

/// `t.col1, t.col2, ...`
fn select_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("t.{}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Helper to convert a result row into a [`Row`]; column 0 is always `id`
///
/// Blob values have no JSON form in entity summaries and read as `null`.
fn read_row(row: &rusqlite::Row, columns: &[&str]) -> rusqlite::Result<Row> {
    let id: i64 = row.get(0)?;
    let mut values = BTreeMap::new();

    for (idx, column) in columns.iter().enumerate().skip(1) {
        let value = match row.get_ref(idx)? {
            ValueRef::Null | ValueRef::Blob(_) => serde_json::Value::Null,
            ValueRef::Integer(i) => serde_json::Value::from(i),
            ValueRef::Real(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()),
        };
        values.insert((*column).to_string(), value);
    }

    Ok(Row { id, values })
}

fn json_to_sql(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub tables: Vec<(String, usize)>,
}

impl DbStats {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, count)| count).sum()
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (table, count) in &self.tables {
            writeln!(f, "  {}: {}", table, count)?;
        }
        write!(f, "  Total rows: {}", self.total_rows())
    }
}
