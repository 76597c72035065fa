//! `SQLite` executor for the `companies` table.

use rusqlite::types::ToSqlOutput;
use rusqlite::{Connection, OpenFlags, Row, ToSql};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{DatabaseError, QueryExecutor};
use crate::model::types::{COMPANY_COLUMNS, CompanyRecord};
use crate::search::compile::CompiledQuery;
use crate::search::predicate::PredicateValue;

impl ToSql for PredicateValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            PredicateValue::Integer(v) => ToSqlOutput::from(*v),
            PredicateValue::Real(v) => ToSqlOutput::from(*v),
            PredicateValue::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

/// Read-only connection that executes [`CompiledQuery`] statements.
pub struct SqliteExecutor {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    /// Open `path` read-only. A missing file is reported, never created.
    pub fn open_readonly(path: &Path, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        if !path.exists() {
            return Err(DatabaseError::NotFound(path.to_path_buf()));
        }
        let start = Instant::now();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        apply_pragmas(&conn, busy_timeout)?;
        info!(
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis(),
            "opened SQLite database read-only"
        );
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an existing connection; `query_only` is switched on.
    pub fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        conn.pragma_update(None, "query_only", true)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of rows in `companies`.
    pub fn company_count(&self) -> Result<i64, DatabaseError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM companies", [], |r| r.get(0))?)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<CompanyRecord>, DatabaseError> {
        let start = Instant::now();
        let mut stmt = self.conn.prepare(query.sql_text())?;
        if !stmt.readonly() {
            return Err(DatabaseError::Rejected(
                "statement would modify the database".to_string(),
            ));
        }
        if stmt.column_count() != COMPANY_COLUMNS.len() {
            return Err(DatabaseError::Rejected(format!(
                "expected {} columns, statement returns {}",
                COMPANY_COLUMNS.len(),
                stmt.column_count()
            )));
        }

        let rows = stmt.query_map(
            rusqlite::params_from_iter(query.params().iter()),
            company_from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }

        debug!(
            rows = out.len(),
            limit = query.limit(),
            elapsed_ms = start.elapsed().as_millis(),
            "query_executed"
        );
        Ok(out)
    }
}

fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> Result<(), DatabaseError> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "query_only", true)?;
    Ok(())
}

/// Map a row by projection index; see [`COMPANY_COLUMNS`].
fn company_from_row(row: &Row<'_>) -> rusqlite::Result<CompanyRecord> {
    Ok(CompanyRecord {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        description: row.get(2)?,
        industry: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        country: row.get(6)?,
        headcount: row.get(7)?,
        revenue: row.get(8)?,
        founded_year: row.get(9)?,
        website: row.get(10)?,
    })
}
