use crate::error::Result;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Thin execution harness over a single SQLite connection.
///
/// Every statement runs in autocommit mode unless the caller opens a
/// transaction explicitly (only the loader does).
pub struct Database {
    conn: Connection,
}

/// Rows returned from an ad hoc read query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub kind: String,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P, foreign_keys: bool) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::configure(conn, foreign_keys)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?, true)
    }

    fn configure(conn: Connection, foreign_keys: bool) -> Result<Self> {
        let pragma = if foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        conn.execute_batch(pragma)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute one statement, returning the number of rows it changed.
    pub fn run_command(&self, sql: &str) -> Result<usize> {
        debug!(sql = %sql.trim(), "Executing command");
        Ok(self.conn.execute(sql, [])?)
    }

    pub fn run_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run a read query and render every value as text.
    pub fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                let value: Value = row.get(i)?;
                values.push(display_value(&value));
            }
            out.push(values);
        }
        Ok(QueryResult { columns, rows: out })
    }

    pub fn show_tables(&self) -> Result<Vec<TableInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| {
                Ok(TableInfo {
                    name: row.get(0)?,
                    kind: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Add `column` to `table` unless the schema already has it.
    /// Returns whether the column was added.
    pub fn ensure_column(&self, table: &str, column: &str, decl_type: &str) -> Result<bool> {
        if self.column_exists(table, column)? {
            debug!(table, column, "Column already present");
            return Ok(false);
        }
        self.run_command(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(table),
            quote_ident(column),
            decl_type
        ))?;
        Ok(true)
    }

    pub fn row_count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    pub fn drop_table(&self, table: &str) -> Result<()> {
        self.run_command(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))?;
        Ok(())
    }
}

/// Double-quote an identifier so names like `1b_umpire_id` survive.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("1b_umpire_id"), "\"1b_umpire_id\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_ensure_column_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.run_command("CREATE TABLE t (a)").unwrap();
        assert!(db.ensure_column("t", "game_id", "TEXT").unwrap());
        assert!(!db.ensure_column("t", "game_id", "TEXT").unwrap());
        assert!(db.column_exists("t", "game_id").unwrap());
    }

    #[test]
    fn test_ensure_column_propagates_real_errors() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.ensure_column("no_such_table", "game_id", "TEXT").is_err());
    }

    #[test]
    fn test_run_query_renders_values() {
        let db = Database::open_in_memory().unwrap();
        db.run_batch("CREATE TABLE t (a, b); INSERT INTO t VALUES (1, NULL), (2.5, 'x');")
            .unwrap();
        let result = db.run_query("SELECT a, b FROM t ORDER BY a").unwrap();
        assert_eq!(result.columns, vec!["a", "b"]);
        assert_eq!(result.rows[0], vec!["1", "NULL"]);
        assert_eq!(result.rows[1], vec!["2.5", "x"]);
    }

    #[test]
    fn test_show_tables_and_drop() {
        let db = Database::open_in_memory().unwrap();
        db.run_command("CREATE TABLE staging (a)").unwrap();
        assert!(db.table_exists("staging").unwrap());
        assert_eq!(db.show_tables().unwrap().len(), 1);
        db.drop_table("staging").unwrap();
        db.drop_table("staging").unwrap();
        assert!(!db.table_exists("staging").unwrap());
    }
}
