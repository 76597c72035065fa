//! Post-retrieval relevance ranking.
//!
//! Scores are lexical and corpus-local: term statistics come from the rows
//! of the current result set only.
//!
//! For keyword `t` and row `r`:
//!
//! - `tf(t, r)`: number of tokens of `r`'s name/description/industry that
//!   contain `t`, or 1 when `t` only appears as a substring spanning token
//!   boundaries (e.g. "e-commerce").
//! - `idf(t) = ln((1 + N) / (1 + df(t))) + 1`
//! - `w(t, r) = idf(t) * (1 + ln tf(t, r))` for `tf > 0`, else 0.
//!
//! The score is the dot product of the keyword-presence vector with the
//! row's weight vector, divided by the same dot product taken against the
//! per-keyword maximum weight across the result set. Every keyword thus
//! contributes at most its own share, which keeps scores in `[0, 1]` and
//! guarantees that matching more keywords never lowers a row's score.

use serde::Serialize;
use tracing::debug;

use crate::model::types::CompanyRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub row: CompanyRecord,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

pub fn idf(rows: usize, doc_freq: usize) -> f64 {
    ((1.0 + rows as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
}

/// Rank rows against `keywords`, best first; ties keep retrieval order.
pub fn rank(rows: Vec<CompanyRecord>, keywords: &[String]) -> Vec<RankedResult> {
    let terms = normalize_keywords(keywords);
    if terms.is_empty() {
        return rows
            .into_iter()
            .map(|row| RankedResult {
                row,
                score: 0.0,
                matched_keywords: Vec::new(),
            })
            .collect();
    }

    let tf: Vec<Vec<u32>> = rows
        .iter()
        .map(|row| {
            let text = row.ranking_text().to_lowercase();
            let tokens = text_tokens(&text);
            terms
                .iter()
                .map(|term| term_frequency(term, &text, &tokens))
                .collect()
        })
        .collect();

    let n = rows.len();
    let idfs: Vec<f64> = (0..terms.len())
        .map(|t| idf(n, tf.iter().filter(|row_tf| row_tf[t] > 0).count()))
        .collect();

    let weight = |t: usize, freq: u32| {
        if freq == 0 {
            0.0
        } else {
            idfs[t] * (1.0 + f64::from(freq).ln())
        }
    };

    // Keywords absent from every row still count against the ceiling.
    let ceiling: f64 = (0..terms.len())
        .map(|t| {
            let max_tf = tf.iter().map(|row_tf| row_tf[t]).max().unwrap_or(0).max(1);
            weight(t, max_tf)
        })
        .sum();

    let mut ranked: Vec<RankedResult> = rows
        .into_iter()
        .zip(&tf)
        .map(|(row, row_tf)| {
            let dot: f64 = row_tf.iter().enumerate().map(|(t, f)| weight(t, *f)).sum();
            let score = if ceiling > 0.0 {
                (dot / ceiling).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let matched_keywords = terms
                .iter()
                .zip(row_tf)
                .filter(|(_, f)| **f > 0)
                .map(|(term, _)| term.clone())
                .collect();
            RankedResult {
                row,
                score,
                matched_keywords,
            }
        })
        .collect();

    // `sort_by` is stable: equal scores keep retrieval order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        rows = ranked.len(),
        keywords = terms.len(),
        top_score = ranked.first().map(|r| r.score).unwrap_or(0.0),
        "results_ranked"
    );
    ranked
}

/// Lower-case, trim, drop blanks and repeats.
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::with_capacity(keywords.len());
    for kw in keywords {
        let term = kw.trim().to_lowercase();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

fn text_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn term_frequency(term: &str, text: &str, tokens: &[&str]) -> u32 {
    let hits = tokens.iter().filter(|tok| tok.contains(term)).count() as u32;
    if hits == 0 && text.contains(term) {
        1
    } else {
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: i64, name: &str, description: &str) -> CompanyRecord {
        CompanyRecord {
            id,
            name: name.into(),
            description: Some(description.into()),
            industry: Some("Software".into()),
            ..Default::default()
        }
    }

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn row_with_both_terms_ranks_first() {
        let rows = vec![
            company(1, "Ledgerly", "Accounting suite for small firms"),
            company(2, "Brewtab", "POS system built for coffee shops"),
        ];
        let ranked = rank(rows, &kws(&["pos", "coffee"]));
        assert_eq!(ranked[0].row.id, 2);
        assert!(ranked[0].score > ranked[1].score);
        assert_eq!(ranked[1].score, 0.0);
        assert_eq!(ranked[0].matched_keywords, vec!["pos", "coffee"]);
        assert!(ranked[1].matched_keywords.is_empty());
    }

    #[test]
    fn empty_keywords_preserve_order_with_zero_scores() {
        let rows = vec![company(1, "A", "x"), company(2, "B", "y"), company(3, "C", "z")];
        let ranked = rank(rows, &[]);
        let ids: Vec<i64> = ranked.iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(ranked.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn ties_keep_retrieval_order() {
        let rows = vec![
            company(7, "Alpha", "coffee roaster"),
            company(3, "Beta", "coffee roaster"),
            company(5, "Gamma", "tea"),
        ];
        let ranked = rank(rows, &kws(&["coffee"]));
        let ids: Vec<i64> = ranked.iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let rows = vec![
            company(1, "Coffee Coffee", "coffee coffee coffee"),
            company(2, "Bean", "coffee"),
            company(3, "Nothing", "here"),
        ];
        for r in rank(rows, &kws(&["coffee", "espresso"])) {
            assert!((0.0..=1.0).contains(&r.score), "{}", r.score);
        }
    }

    #[test]
    fn more_matched_keywords_never_score_lower() {
        let rows = vec![
            company(1, "One", "pos"),
            company(2, "Two", "pos coffee"),
            company(3, "Three", "pos coffee roastery"),
        ];
        let ranked = rank(rows, &kws(&["pos", "coffee", "roastery"]));
        let ids: Vec<i64> = ranked.iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn substring_matches_count() {
        let rows = vec![company(1, "Shopfront", "e-commerce storefronts")];
        let ranked = rank(rows, &kws(&["e-commerce", "shop"]));
        assert_eq!(ranked[0].matched_keywords, vec!["e-commerce", "shop"]);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn idf_is_smoothed() {
        assert!((idf(4, 4) - 1.0).abs() < 1e-12);
        assert!(idf(4, 0) > idf(4, 1));
    }

    #[test]
    fn ranking_is_deterministic() {
        let rows = vec![
            company(1, "A", "coffee pos"),
            company(2, "B", "coffee"),
            company(3, "C", "pos"),
        ];
        let keywords = kws(&["pos", "coffee"]);
        assert_eq!(rank(rows.clone(), &keywords), rank(rows, &keywords));
    }
}
