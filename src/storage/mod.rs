//! Storage boundary: the read-only executor the search pipeline runs against.

pub mod sqlite;

use std::path::PathBuf;
use thiserror::Error;

use crate::model::types::CompanyRecord;
use crate::search::compile::CompiledQuery;

/// Failure raised by a [`QueryExecutor`]. Surfaced to callers unchanged; never retried.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database not found at {0}")]
    NotFound(PathBuf),
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("Statement rejected: {0}")]
    Rejected(String),
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Runs a compiled statement and returns rows in projection order.
///
/// Implementations must be read-only.
pub trait QueryExecutor {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<CompanyRecord>, DatabaseError>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn execute(&self, query: &CompiledQuery) -> Result<Vec<CompanyRecord>, DatabaseError> {
        (**self).execute(query)
    }
}
