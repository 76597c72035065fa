//! Search layer facade.
//!
//! Natural-language company search as a five-stage pipeline:
//!
//! - **[`intent`]**: free text → [`SearchIntent`](crate::model::types::SearchIntent).
//! - **[`vocab`]**: static location, industry and stopword tables used by `intent`.
//! - **[`predicate`]**: intent → AND-combined column predicates.
//! - **[`compile`]**: predicates → a bounded, parameterised `SELECT`.
//! - **[`rank`]**: corpus-local TF-IDF re-ranking of the returned rows.
//! - **[`query`]**: [`CompanySearch`](query::CompanySearch), which wires the
//!   stages to a [`QueryExecutor`](crate::storage::QueryExecutor).

pub mod compile;
pub mod intent;
pub mod predicate;
pub mod query;
pub mod rank;
pub mod vocab;
