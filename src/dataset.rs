//! Puzzle Dataset - SQLite store holding bombs, components, suspects and access logs
//!
//! Bootstrapped once from a schema script and a seed script. Player queries run
//! on a fresh read-only connection that is closed after the query, so the
//! dataset cannot be mutated through the game even if the query gate is bypassed.

use crate::error::{GameError, Result};
use crate::row::{Row, SqlValue};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub const SCHEMA_FILE: &str = "schema.sql";
pub const SEED_FILE: &str = "sample_data.sql";

const EMBEDDED_SCHEMA: &str = include_str!("../database/schema.sql");
const EMBEDDED_SEED: &str = include_str!("../database/sample_data.sql");

/// The SQL scripts a dataset is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetScripts {
    pub schema: String,
    pub seed: String,
}

impl DatasetScripts {
    /// Scripts compiled into the binary
    pub fn embedded() -> Self {
        Self {
            schema: EMBEDDED_SCHEMA.to_string(),
            seed: EMBEDDED_SEED.to_string(),
        }
    }

    /// Read `schema.sql` and `sample_data.sql` from a directory. A file that
    /// does not exist falls back to the embedded copy.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            schema: read_or_embedded(&dir.join(SCHEMA_FILE), EMBEDDED_SCHEMA)?,
            seed: read_or_embedded(&dir.join(SEED_FILE), EMBEDDED_SEED)?,
        })
    }
}

fn read_or_embedded(path: &Path, embedded: &str) -> Result<String> {
    if path.exists() {
        debug!("Reading dataset script {}", path.display());
        Ok(fs::read_to_string(path)?)
    } else {
        debug!("{} not found, using embedded script", path.display());
        Ok(embedded.to_string())
    }
}

/// Rows produced by one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub execution_time_ms: u64,
}

impl QueryOutput {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self.rows.iter().map(Row::to_json).collect();
        serde_json::json!({
            "columns": self.columns,
            "rows": rows,
            "row_count": self.rows.len(),
            "execution_time_ms": self.execution_time_ms,
        })
    }
}

/// Table name with its columns, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
}

impl Dataset {
    /// Create the database file from the scripts.
    ///
    /// An existing file is kept as-is unless `force` is set, in which case it is
    /// removed and rebuilt. A failed build leaves no partial file behind.
    pub fn bootstrap(path: impl AsRef<Path>, scripts: &DatasetScripts, force: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if path.exists() {
            if !force {
                info!("Database already exists at {}. Skipping initialization.", path.display());
                return Ok(Self { path });
            }
            fs::remove_file(&path)?;
            info!("Removed existing database file: {}", path.display());
        }

        if let Err(err) = Self::build(&path, scripts) {
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!("Failed to remove partial database {}: {}", path.display(), cleanup);
            }
            return Err(err);
        }

        info!("✅ Database initialized at {}", path.display());
        Ok(Self { path })
    }

    fn build(path: &Path, scripts: &DatasetScripts) -> Result<()> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&scripts.schema)
            .map_err(|e| GameError::Database(format!("Failed to create schema: {}", e)))?;
        conn.execute_batch(&scripts.seed)
            .map_err(|e| GameError::Database(format!("Failed to insert sample data: {}", e)))?;
        conn.close()
            .map_err(|(_, e)| GameError::Database(format!("Failed to close database: {}", e)))?;
        Ok(())
    }

    /// Open an already bootstrapped database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(GameError::Database(format!(
                "Database not found at {} (run `tictictomb init` first)",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect_read_only(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| GameError::Database(format!("Failed to open database: {}", e)))
    }

    /// Run one query and collect every row with its column names
    pub fn run_query(&self, sql: &str) -> Result<QueryOutput> {
        let start_time = Instant::now();
        let conn = self.connect_read_only()?;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(raw) = cursor.next()? {
            let mut row = Row::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                row.push(name.clone(), value_from_ref(raw.get_ref(idx)?));
            }
            rows.push(row);
        }

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        debug!("Query returned {} rows in {}ms", rows.len(), execution_time_ms);

        Ok(QueryOutput {
            columns,
            rows,
            execution_time_ms,
        })
    }

    /// User tables in creation order with their columns
    pub fn table_summaries(&self) -> Result<Vec<TableSummary>> {
        let conn = self.connect_read_only()?;

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY rowid",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut summaries = Vec::with_capacity(names.len());
        for name in names {
            let mut info = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
            let columns = info
                .query_map([&name], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            summaries.push(TableSummary { name, columns });
        }

        Ok(summaries)
    }
}

fn value_from_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => SqlValue::Text(format!("<blob {} bytes>", bytes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, Dataset) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tictictomb.db");
        let dataset = Dataset::bootstrap(&path, &DatasetScripts::embedded(), false).unwrap();
        (temp_dir, dataset)
    }

    #[test]
    fn test_bootstrap_creates_tables() {
        let (_dir, dataset) = seeded();
        let tables = dataset.table_summaries().unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["bombs", "bomb_components", "suspects", "access_logs"]);
        assert_eq!(
            tables[3].columns,
            vec!["log_id", "suspect_id", "bomb_id", "access_time", "action_performed"]
        );
    }

    #[test]
    fn test_run_query_typed_rows() {
        let (_dir, dataset) = seeded();
        let output = dataset
            .run_query("SELECT bomb_id, location, signal_strength FROM bombs WHERE bomb_id = 2")
            .unwrap();
        assert_eq!(output.columns, vec!["bomb_id", "location", "signal_strength"]);
        assert_eq!(output.row_count(), 1);
        let row = &output.rows[0];
        assert_eq!(row.integer("bomb_id"), Some(2));
        assert_eq!(row.text("location"), "Airport");
        assert_eq!(row.number("signal_strength"), Some(98.0));
    }

    #[test]
    fn test_empty_result() {
        let (_dir, dataset) = seeded();
        let output = dataset
            .run_query("SELECT * FROM bombs WHERE location = 'Moon'")
            .unwrap();
        assert!(output.is_empty());
        assert_eq!(output.columns.len(), 8);
    }

    #[test]
    fn test_connection_is_read_only() {
        let (_dir, dataset) = seeded();
        assert!(dataset.run_query("DELETE FROM bombs").is_err());
        let output = dataset.run_query("SELECT COUNT(*) AS n FROM bombs").unwrap();
        assert_eq!(output.rows[0].integer("n"), Some(8));
    }

    #[test]
    fn test_sql_error_surfaces() {
        let (_dir, dataset) = seeded();
        let err = dataset.run_query("SELECT nope FROM bombs").unwrap_err();
        assert!(matches!(err, GameError::Database(_)));
    }

    #[test]
    fn test_bootstrap_keeps_existing_unless_forced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.db");
        let scripts = DatasetScripts::embedded();
        Dataset::bootstrap(&path, &scripts, false).unwrap();
        // A second non-forced bootstrap must not re-run the seed (which would
        // fail on duplicate primary keys)
        Dataset::bootstrap(&path, &scripts, false).unwrap();
        let dataset = Dataset::bootstrap(&path, &scripts, true).unwrap();
        let output = dataset.run_query("SELECT COUNT(*) AS n FROM suspects").unwrap();
        assert_eq!(output.rows[0].integer("n"), Some(8));
    }

    #[test]
    fn test_failed_bootstrap_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.db");
        let scripts = DatasetScripts {
            schema: "CREATE TABLE bombs (bomb_id INTEGER PRIMARY KEY);".to_string(),
            seed: "INSERT INTO nowhere VALUES (1);".to_string(),
        };
        assert!(Dataset::bootstrap(&path, &scripts, false).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_scripts_falls_back_to_embedded() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SCHEMA_FILE), "CREATE TABLE t (x INTEGER);").unwrap();
        let scripts = DatasetScripts::load(temp_dir.path()).unwrap();
        assert_eq!(scripts.schema, "CREATE TABLE t (x INTEGER);");
        assert_eq!(scripts.seed, DatasetScripts::embedded().seed);
    }

    #[test]
    fn test_open_missing_database() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Dataset::open(temp_dir.path().join("missing.db")).is_err());
    }
}
