//! Normalized entity structs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only table the search pipeline ever reads.
pub const COMPANIES_TABLE: &str = "companies";

/// Fixed projection, in the order rows are returned by the executor.
pub const COMPANY_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "description",
    "industry",
    "city",
    "state",
    "country",
    "headcount",
    "revenue",
    "founded_year",
    "website",
];

/// Columns holding numbers; everything else is text.
pub const NUMERIC_COLUMNS: &[&str] = &["id", "headcount", "revenue", "founded_year"];

pub fn is_company_column(name: &str) -> bool {
    COMPANY_COLUMNS.contains(&name)
}

pub fn is_numeric_column(name: &str) -> bool {
    NUMERIC_COLUMNS.contains(&name)
}

/// One row of the `companies` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub headcount: Option<i64>,
    pub revenue: Option<f64>,
    pub founded_year: Option<i64>,
    pub website: Option<String>,
}

impl CompanyRecord {
    /// Text fields the ranker scores against: name, description, industry.
    pub fn ranking_text(&self) -> String {
        let mut text = self.name.clone();
        for field in [&self.description, &self.industry].into_iter().flatten() {
            text.push(' ');
            text.push_str(field);
        }
        text
    }

    /// "City, ST, Country" with missing parts skipped.
    pub fn location_label(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Numeric fields a size constraint may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeField {
    Headcount,
    Revenue,
}

impl SizeField {
    pub fn column(self) -> &'static str {
        match self {
            SizeField::Headcount => "headcount",
            SizeField::Revenue => "revenue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
}

impl Comparator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Eq => "=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// `(field, comparator, value)` extracted from phrases like "over 20 employees".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraint {
    pub field: SizeField,
    pub comparator: Comparator,
    pub value: f64,
}

/// Structured reading of a free-text request.
///
/// `consumed_tokens` records every token that did not end up in `keywords`:
/// tokens absorbed by a structured field, stopwords, and repeated keywords.
/// Together with `keywords` it reconstructs the input tokenization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIntent {
    pub locations: Vec<String>,
    pub industries: Vec<String>,
    pub size_constraints: Vec<SizeConstraint>,
    pub keywords: Vec<String>,
    pub consumed_tokens: Vec<String>,
}

impl SearchIntent {
    /// True when no structured filter was recognised.
    pub fn is_unstructured(&self) -> bool {
        self.locations.is_empty() && self.industries.is_empty() && self.size_constraints.is_empty()
    }
}
