//! Query compilation: predicates → one bounded, read-only `SELECT`.
//!
//! The statement always projects the full eleven-column list (never `*`),
//! joins predicates with `AND`, and ends in a single `LIMIT`. Values are
//! never spliced into `sql_text`: each predicate contributes a positional
//! `?` placeholder and a typed bound parameter. [`CompiledQuery::inline_sql`]
//! renders an escaped display form for logs and `explain`.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::predicate::{Operator, Predicate, PredicateValue};
use crate::model::types::{COMPANIES_TABLE, COMPANY_COLUMNS, is_company_column, is_numeric_column};

/// Default row cap when nothing narrows the query.
pub const DEFAULT_LIMIT: usize = 32;
/// Floor for the narrowed cap.
pub const MIN_LIMIT: usize = 8;
/// Hard ceiling, including explicit overrides.
pub const MAX_LIMIT: usize = 256;

const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("column `{0}` is not part of the companies schema")]
    UnknownColumn(String),
    #[error("`{column} {operator}` requires a {expected} value, got {found}")]
    TypeMismatch {
        column: String,
        operator: Operator,
        expected: &'static str,
        found: String,
    },
    #[error("empty LIKE pattern for column `{0}`")]
    EmptyPattern(String),
    #[error("non-finite number for column `{0}`")]
    NonFinite(String),
}

/// Row-cap heuristic.
///
/// Each `=` predicate adds 2 to a specificity score, every other predicate
/// adds 1. A score of 0 or 1 keeps `default`; each further point halves the
/// cap, never going below `min`. The result depends only on the predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitPolicy {
    pub default: usize,
    pub min: usize,
    pub max: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            min: MIN_LIMIT,
            max: MAX_LIMIT,
        }
    }
}

impl LimitPolicy {
    pub fn specificity(predicates: &[Predicate]) -> u32 {
        predicates
            .iter()
            .map(|p| if p.operator == Operator::Eq { 2 } else { 1 })
            .sum()
    }

    pub fn limit_for(&self, predicates: &[Predicate]) -> usize {
        let score = Self::specificity(predicates);
        let limit = if score <= 1 {
            self.default
        } else {
            self.default.checked_shr(score - 1).unwrap_or(0).max(self.min)
        };
        limit.clamp(1, self.max.max(1))
    }

    /// An explicit override wins over the heuristic but stays within `[1, max]`.
    pub fn resolve(&self, predicates: &[Predicate], override_limit: Option<usize>) -> usize {
        match override_limit {
            Some(limit) => limit.clamp(1, self.max.max(1)),
            None => self.limit_for(predicates),
        }
    }
}

/// A finished statement plus its bound parameters. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    sql_text: String,
    projected_columns: Vec<&'static str>,
    limit: usize,
    params: Vec<PredicateValue>,
    #[serde(rename = "display_sql")]
    inline_sql: String,
}

impl CompiledQuery {
    /// Statement text with `?` placeholders.
    pub fn sql_text(&self) -> &str {
        &self.sql_text
    }

    pub fn projected_columns(&self) -> &[&'static str] {
        &self.projected_columns
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Parameters in placeholder order.
    pub fn params(&self) -> &[PredicateValue] {
        &self.params
    }

    /// Display form with escaped literals in place of placeholders. Never executed.
    pub fn inline_sql(&self) -> &str {
        &self.inline_sql
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler {
    policy: LimitPolicy,
}

impl QueryCompiler {
    pub fn new(policy: LimitPolicy) -> Self {
        Self { policy }
    }

    pub fn compile(&self, predicates: &[Predicate]) -> Result<CompiledQuery, CompileError> {
        self.compile_with_limit(predicates, None)
    }

    pub fn compile_with_limit(
        &self,
        predicates: &[Predicate],
        override_limit: Option<usize>,
    ) -> Result<CompiledQuery, CompileError> {
        let projection = COMPANY_COLUMNS.join(", ");
        let limit = self.policy.resolve(predicates, override_limit);

        let mut clauses = Vec::with_capacity(predicates.len());
        let mut inline_clauses = Vec::with_capacity(predicates.len());
        let mut params = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            let fragment = render(predicate)?;
            clauses.push(fragment.sql);
            inline_clauses.push(fragment.inline);
            params.push(fragment.param);
        }

        let (sql_text, inline_sql) = if clauses.is_empty() {
            (
                format!("SELECT {projection} FROM {COMPANIES_TABLE} LIMIT {limit};"),
                format!("SELECT {projection} FROM {COMPANIES_TABLE} LIMIT {limit};"),
            )
        } else {
            (
                format!(
                    "SELECT {projection} FROM {COMPANIES_TABLE} WHERE {} LIMIT {limit};",
                    clauses.join(" AND ")
                ),
                format!(
                    "SELECT {projection} FROM {COMPANIES_TABLE} WHERE {} LIMIT {limit};",
                    inline_clauses.join(" AND ")
                ),
            )
        };

        debug!(
            sql = %inline_sql,
            limit = limit,
            params = params.len(),
            "query_compiled"
        );

        Ok(CompiledQuery {
            sql_text,
            projected_columns: COMPANY_COLUMNS.to_vec(),
            limit,
            params,
            inline_sql,
        })
    }
}

/// Compile with the default [`LimitPolicy`].
pub fn compile(predicates: &[Predicate]) -> Result<CompiledQuery, CompileError> {
    QueryCompiler::default().compile(predicates)
}

struct Fragment {
    sql: String,
    inline: String,
    param: PredicateValue,
}

fn render(predicate: &Predicate) -> Result<Fragment, CompileError> {
    let column = predicate.column();
    if !is_company_column(column) {
        return Err(CompileError::UnknownColumn(column.to_string()));
    }
    check_types(predicate)?;

    let op = predicate.operator;
    match (&predicate.value, op) {
        (PredicateValue::Text(text), Operator::Like) => {
            let needle = text.trim();
            if needle.is_empty() {
                return Err(CompileError::EmptyPattern(column.to_string()));
            }
            let escaped = escape_like(needle);
            let escape_clause = if escaped.len() == needle.len() {
                String::new()
            } else {
                format!(" ESCAPE '{LIKE_ESCAPE}'")
            };
            let pattern = format!("%{escaped}%");
            Ok(Fragment {
                sql: format!("{column} LIKE ?{escape_clause}"),
                inline: format!("{column} LIKE {}{escape_clause}", quote(&pattern)),
                param: PredicateValue::Text(pattern),
            })
        }
        (value, op) => Ok(Fragment {
            sql: format!("{column} {op} ?"),
            inline: format!("{column} {op} {value}"),
            param: value.clone(),
        }),
    }
}

fn check_types(predicate: &Predicate) -> Result<(), CompileError> {
    let column = predicate.column();
    let op = predicate.operator;
    let numeric_column = is_numeric_column(column);

    let mismatch = |expected: &'static str| CompileError::TypeMismatch {
        column: column.to_string(),
        operator: op,
        expected,
        found: predicate.value.to_string(),
    };

    match &predicate.value {
        PredicateValue::Real(v) if !v.is_finite() => {
            Err(CompileError::NonFinite(column.to_string()))
        }
        PredicateValue::Text(_) if op.is_range() || numeric_column => Err(mismatch("numeric")),
        PredicateValue::Integer(_) | PredicateValue::Real(_)
            if op == Operator::Like || !numeric_column =>
        {
            Err(mismatch("text"))
        }
        _ => Ok(()),
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
