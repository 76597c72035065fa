//! Predicate building: [`SearchIntent`] → AND-combined column filters.
//!
//! Mapping rules:
//!
//! | intent entry             | predicate                         |
//! |--------------------------|-----------------------------------|
//! | city                     | `city LIKE '%token%'`             |
//! | state code / state name  | `state = 'XX'`                    |
//! | country                  | `country LIKE '%token%'`          |
//! | industry                 | `industry LIKE '%token%'`         |
//! | size constraint          | `<column> <op> <number>`          |
//!
//! Keywords never become predicates; they only feed the ranker.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::vocab::{self, LocationKind};
use crate::model::types::{Comparator, SearchIntent, SizeConstraint, is_company_column};

/// Raised when a predicate names a column outside the `companies` projection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredicateBuildError {
    #[error("column `{0}` is not part of the companies schema")]
    UnknownColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Like => "LIKE",
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    /// Ordering comparators only make sense against numbers.
    pub fn is_range(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le
        )
    }
}

impl From<Comparator> for Operator {
    fn from(cmp: Comparator) -> Self {
        match cmp {
            Comparator::Gt => Operator::Gt,
            Comparator::Lt => Operator::Lt,
            Comparator::Ge => Operator::Ge,
            Comparator::Le => Operator::Le,
            Comparator::Eq => Operator::Eq,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl PredicateValue {
    /// Integers when the number is whole and fits, reals otherwise.
    pub fn number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            PredicateValue::Integer(value as i64)
        } else {
            PredicateValue::Real(value)
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, PredicateValue::Text(_))
    }
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateValue::Integer(v) => write!(f, "{v}"),
            PredicateValue::Real(v) => write!(f, "{v}"),
            PredicateValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

/// One `column operator value` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    column: String,
    pub operator: Operator,
    pub value: PredicateValue,
}

impl Predicate {
    /// Construct a predicate, rejecting columns outside the schema.
    pub fn new(
        column: &str,
        operator: Operator,
        value: PredicateValue,
    ) -> Result<Self, PredicateBuildError> {
        if !is_company_column(column) {
            return Err(PredicateBuildError::UnknownColumn(column.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            operator,
            value,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    fn like(column: &str, token: &str) -> Result<Self, PredicateBuildError> {
        Self::new(column, Operator::Like, PredicateValue::Text(token.to_string()))
    }

    fn size(constraint: &SizeConstraint) -> Result<Self, PredicateBuildError> {
        Self::new(
            constraint.field.column(),
            constraint.comparator.into(),
            PredicateValue::number(constraint.value),
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.operator, &self.value) {
            (Operator::Like, PredicateValue::Text(v)) => {
                write!(f, "{} LIKE '%{}%'", self.column, v.replace('\'', "''"))
            }
            (op, value) => write!(f, "{} {} {}", self.column, op, value),
        }
    }
}

/// Map an intent to predicates: locations, then industries, then sizes.
pub fn build(intent: &SearchIntent) -> Result<Vec<Predicate>, PredicateBuildError> {
    let mut predicates = Vec::with_capacity(
        intent.locations.len() + intent.industries.len() + intent.size_constraints.len(),
    );

    for location in &intent.locations {
        predicates.push(location_predicate(location)?);
    }
    for industry in &intent.industries {
        predicates.push(Predicate::like("industry", industry)?);
    }
    for constraint in &intent.size_constraints {
        predicates.push(Predicate::size(constraint)?);
    }

    debug!(
        count = predicates.len(),
        predicates = %predicates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND "),
        "predicates_built"
    );
    Ok(predicates)
}

fn location_predicate(token: &str) -> Result<Predicate, PredicateBuildError> {
    if vocab::is_state_code(token) {
        return Predicate::new("state", Operator::Eq, PredicateValue::Text(token.to_string()));
    }
    match vocab::location(&token.to_lowercase()).map(|entry| entry.kind) {
        Some(LocationKind::State(code)) => {
            Predicate::new("state", Operator::Eq, PredicateValue::Text(code.to_string()))
        }
        Some(LocationKind::Country) => Predicate::like("country", token),
        Some(LocationKind::City) | None => Predicate::like("city", token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::SizeField;

    fn scenario_intent() -> SearchIntent {
        SearchIntent {
            locations: vec!["Boston".into()],
            industries: vec!["Software".into()],
            size_constraints: vec![SizeConstraint {
                field: SizeField::Headcount,
                comparator: Comparator::Gt,
                value: 20.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn maps_location_industry_and_size() {
        let preds = build(&scenario_intent()).unwrap();
        let rendered: Vec<String> = preds.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "city LIKE '%Boston%'",
                "industry LIKE '%Software%'",
                "headcount > 20",
            ]
        );
    }

    #[test]
    fn state_codes_become_exact_matches() {
        let intent = SearchIntent {
            locations: vec!["Austin".into(), "TX".into(), "Canada".into()],
            ..Default::default()
        };
        let preds = build(&intent).unwrap();
        assert_eq!(preds[0].column(), "city");
        assert_eq!(preds[1].column(), "state");
        assert_eq!(preds[1].operator, Operator::Eq);
        assert_eq!(preds[1].value, PredicateValue::Text("TX".into()));
        assert_eq!(preds[2].column(), "country");
        assert_eq!(preds[2].operator, Operator::Like);
    }

    #[test]
    fn unknown_location_falls_back_to_city() {
        let intent = SearchIntent {
            locations: vec!["Smallville".into()],
            ..Default::default()
        };
        let preds = build(&intent).unwrap();
        assert_eq!(preds[0].to_string(), "city LIKE '%Smallville%'");
    }

    #[test]
    fn keywords_never_produce_predicates() {
        let intent = SearchIntent {
            keywords: vec!["pos".into(), "coffee".into()],
            ..Default::default()
        };
        assert!(build(&intent).unwrap().is_empty());
    }

    #[test]
    fn rejects_columns_outside_schema() {
        let err = Predicate::new("ceo_name", Operator::Eq, PredicateValue::Text("x".into()))
            .unwrap_err();
        assert_eq!(err, PredicateBuildError::UnknownColumn("ceo_name".into()));
    }

    #[test]
    fn fractional_revenue_stays_real() {
        assert_eq!(PredicateValue::number(2.5e6), PredicateValue::Integer(2_500_000));
        assert_eq!(PredicateValue::number(0.5), PredicateValue::Real(0.5));
    }

    #[test]
    fn build_is_deterministic() {
        let intent = scenario_intent();
        assert_eq!(build(&intent).unwrap(), build(&intent).unwrap());
    }
}
