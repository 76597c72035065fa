//! Search pipeline: extract → build → compile → execute → rank.

use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use super::compile::{CompileError, CompiledQuery, QueryCompiler};
use super::intent;
use super::predicate::{self, Predicate, PredicateBuildError};
use super::rank::{self, RankedResult};
use crate::model::types::SearchIntent;
use crate::storage::{DatabaseError, QueryExecutor};

/// Coarse failure category, so callers can tell a malformed request from an
/// unavailable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchErrorKind {
    PredicateBuild,
    Compile,
    Database,
}

impl SearchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchErrorKind::PredicateBuild => "predicate_build",
            SearchErrorKind::Compile => "compile",
            SearchErrorKind::Database => "database",
        }
    }
}

impl fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("predicate build error: {0}")]
    PredicateBuild(#[from] PredicateBuildError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::PredicateBuild(_) => SearchErrorKind::PredicateBuild,
            SearchError::Compile(_) => SearchErrorKind::Compile,
            SearchError::Database(_) => SearchErrorKind::Database,
        }
    }
}

/// Everything the pipeline decided before touching the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPlan {
    pub intent: SearchIntent,
    pub predicates: Vec<Predicate>,
    pub compiled_query: CompiledQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMetadata {
    pub intent: SearchIntent,
    pub predicates: Vec<Predicate>,
    pub compiled_query: CompiledQuery,
    pub result_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RankedResult>,
    pub metadata: SearchMetadata,
}

/// Extract, build and compile `query`; the store is not consulted.
pub fn plan(
    query: &str,
    compiler: &QueryCompiler,
    limit: Option<usize>,
) -> Result<SearchPlan, SearchError> {
    let intent = intent::extract(query);
    let predicates = predicate::build(&intent)?;
    let compiled_query = compiler.compile_with_limit(&predicates, limit)?;
    Ok(SearchPlan {
        intent,
        predicates,
        compiled_query,
    })
}

/// Runs the search pipeline against one executor. Holds no per-request state.
pub struct CompanySearch<E> {
    executor: E,
    compiler: QueryCompiler,
}

impl<E: QueryExecutor> CompanySearch<E> {
    pub fn new(executor: E) -> Self {
        Self::with_compiler(executor, QueryCompiler::default())
    }

    pub fn with_compiler(executor: E, compiler: QueryCompiler) -> Self {
        Self { executor, compiler }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Extract, build and compile without executing.
    pub fn plan(&self, query: &str, limit: Option<usize>) -> Result<SearchPlan, SearchError> {
        plan(query, &self.compiler, limit)
    }

    pub fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        self.search_with_limit(query, None)
    }

    pub fn search_with_limit(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchResponse, SearchError> {
        let start = Instant::now();
        info!(query = query, limit = ?limit, "search_start");

        let SearchPlan {
            intent,
            predicates,
            compiled_query,
        } = self.plan(query, limit)?;

        let rows = self.executor.execute(&compiled_query).map_err(|e| {
            warn!(error = %e, sql = compiled_query.inline_sql(), "query execution failed");
            e
        })?;
        let result_count = rows.len();
        let results = rank::rank(rows, &intent.keywords);

        info!(
            results = result_count,
            limit = compiled_query.limit(),
            predicates = predicates.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "search_done"
        );

        Ok(SearchResponse {
            results,
            metadata: SearchMetadata {
                intent,
                predicates,
                compiled_query,
                result_count,
            },
        })
    }
}
