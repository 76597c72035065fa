//! Intent extraction: free text → [`SearchIntent`].
//!
//! Extraction runs in three passes over one tokenization of the input:
//!
//! 1. **Size phrases** - "over 20 employees", "under $5M revenue",
//!    "between 10 and 50 staff", "100+ employees".
//! 2. **Vocabulary phrases** - locations first, then industries, longest
//!    token window first. A token no window claims may still name an
//!    industry by containing one ("retailers", "software-based").
//! 3. **Keyword residue** - everything left that is not a stopword,
//!    lower-cased and deduplicated in first-seen order.
//!
//! A token is claimed by at most one pass. Every token that does not land in
//! `keywords` is recorded in `consumed_tokens`, so the two lists together
//! always reconstruct the tokenization.
//!
//! Extraction never fails: unrecognised input simply falls through to keywords.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::vocab::{self, LocationEntry, MAX_PHRASE_TOKENS};
use crate::model::types::{Comparator, SearchIntent, SizeConstraint, SizeField};

/// A whitespace-delimited word with surrounding punctuation trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub lower: String,
}

/// Split on whitespace and trim punctuation; a leading `$` and a trailing `+`
/// survive because size phrases need them.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|word| {
            let trimmed = word
                .trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '$'))
                .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '+'));
            if trimmed.is_empty() {
                None
            } else {
                Some(Token {
                    raw: trimmed.to_string(),
                    lower: trimmed.to_lowercase(),
                })
            }
        })
        .collect()
}

/// Parse a free-text request into a structured intent.
pub fn extract(query_text: &str) -> SearchIntent {
    let tokens = tokenize(query_text);
    let mut claimed = vec![false; tokens.len()];
    let mut intent = SearchIntent::default();

    extract_sizes(&tokens, &mut claimed, &mut intent);
    extract_vocabulary(&tokens, &mut claimed, &mut intent);

    for (token, taken) in tokens.iter().zip(&claimed) {
        if *taken {
            intent.consumed_tokens.push(token.lower.clone());
        } else if vocab::is_stopword(&token.lower) || intent.keywords.contains(&token.lower) {
            intent.consumed_tokens.push(token.lower.clone());
        } else {
            intent.keywords.push(token.lower.clone());
        }
    }

    debug!(
        locations = ?intent.locations,
        industries = ?intent.industries,
        sizes = intent.size_constraints.len(),
        keywords = ?intent.keywords,
        "intent_extracted"
    );
    intent
}

fn extract_sizes(tokens: &[Token], claimed: &mut [bool], intent: &mut SearchIntent) {
    let lower: Vec<&str> = tokens.iter().map(|t| t.lower.as_str()).collect();
    let mut i = 0;
    while i < lower.len() {
        match match_size_phrase(&lower[i..]) {
            Some((constraints, len)) => {
                claimed[i..i + len].iter_mut().for_each(|c| *c = true);
                intent.size_constraints.extend(constraints);
                i += len;
            }
            None => i += 1,
        }
    }
}

fn extract_vocabulary(tokens: &[Token], claimed: &mut [bool], intent: &mut SearchIntent) {
    let mut i = 0;
    while i < tokens.len() {
        if claimed[i] {
            i += 1;
            continue;
        }
        let max_window = MAX_PHRASE_TOKENS.min(tokens.len() - i);
        let mut advanced = false;
        for width in (1..=max_window).rev() {
            if claimed[i..i + width].iter().any(|c| *c) {
                continue;
            }
            let window = &tokens[i..i + width];
            let phrase = window
                .iter()
                .map(|t| t.lower.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            if let Some(entry) = location_for(&phrase, window) {
                push_unique(&mut intent.locations, entry.canonical);
            } else if let Some(industry) = vocab::industry(&phrase) {
                push_unique(&mut intent.industries, industry);
            } else {
                continue;
            }
            claimed[i..i + width].iter_mut().for_each(|c| *c = true);
            i += width;
            advanced = true;
            break;
        }
        if !advanced {
            if let Some(industry) = vocab::industry_within(&tokens[i].lower) {
                push_unique(&mut intent.industries, industry);
                claimed[i] = true;
            }
            i += 1;
        }
    }
}

/// Location lookup with the upper-case rule for state codes that double as words.
fn location_for(phrase: &str, window: &[Token]) -> Option<LocationEntry> {
    if window.len() == 1 && vocab::is_ambiguous_state_code(phrase) {
        return vocab::is_state_code(&window[0].raw)
            .then(|| vocab::location(phrase))
            .flatten();
    }
    vocab::location(phrase)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

// -------------------------------------------------------------------------
// Size phrases
// -------------------------------------------------------------------------

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\$)?(\d[\d,]*(?:\.\d+)?)([kmb])?(\+)?$").expect("valid amount regex")
});

const EMPLOYEE_WORDS: &[&str] = &[
    "employee",
    "employees",
    "staff",
    "people",
    "person",
    "persons",
    "workers",
    "headcount",
];

const REVENUE_WORDS: &[&str] = &["revenue", "revenues", "sales", "turnover", "arr"];

/// Filler allowed between an amount and a trailing revenue word ("$5M in annual revenue").
const REVENUE_CONNECTORS: &[&str] = &["in", "of", "annual", "yearly"];

const CUES: &[(&[&str], Comparator)] = &[
    (&["more", "than"], Comparator::Gt),
    (&["greater", "than"], Comparator::Gt),
    (&["over"], Comparator::Gt),
    (&["above"], Comparator::Gt),
    (&["exceeding"], Comparator::Gt),
    (&["at", "least"], Comparator::Ge),
    (&["minimum"], Comparator::Ge),
    (&["less", "than"], Comparator::Lt),
    (&["fewer", "than"], Comparator::Lt),
    (&["under"], Comparator::Lt),
    (&["below"], Comparator::Lt),
    (&["at", "most"], Comparator::Le),
    (&["up", "to"], Comparator::Le),
    (&["maximum"], Comparator::Le),
    (&["exactly"], Comparator::Eq),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Amount {
    value: f64,
    dollar: bool,
    scaled: bool,
    plus: bool,
}

/// Parse "20", "1,500", "$5M", "$1.5b", "100+".
fn parse_amount(token: &str) -> Option<Amount> {
    let caps = AMOUNT_RE.captures(token)?;
    let digits = caps.get(2)?.as_str().replace(',', "");
    let mut value: f64 = digits.parse().ok()?;
    let unit = caps.get(3).map(|m| m.as_str());
    if let Some(unit) = unit {
        value *= unit_multiplier(unit)?;
    }
    if !value.is_finite() {
        return None;
    }
    Some(Amount {
        value,
        dollar: caps.get(1).is_some(),
        scaled: unit.is_some(),
        plus: caps.get(4).is_some(),
    })
}

fn unit_multiplier(unit: &str) -> Option<f64> {
    match unit {
        "k" | "thousand" => Some(1e3),
        "m" | "mm" | "million" => Some(1e6),
        "b" | "bn" | "billion" => Some(1e9),
        _ => None,
    }
}

fn match_cue(tokens: &[&str]) -> Option<(Comparator, usize)> {
    CUES.iter().find_map(|(words, cmp)| {
        (tokens.len() >= words.len() && tokens[..words.len()] == **words)
            .then_some((*cmp, words.len()))
    })
}

/// Field named before the cue: "revenue over $5M", "revenue of at least $1B".
fn match_field_prefix(tokens: &[&str]) -> Option<(SizeField, usize)> {
    let first = *tokens.first()?;
    let field = if REVENUE_WORDS.contains(&first) {
        SizeField::Revenue
    } else if first == "headcount" {
        SizeField::Headcount
    } else {
        return None;
    };
    let len = if tokens.get(1) == Some(&"of") { 2 } else { 1 };
    Some((field, len))
}

/// Field named after the amount: "employees", "in revenue", "annual sales".
fn match_field_suffix(tokens: &[&str]) -> Option<(SizeField, usize)> {
    let first = *tokens.first()?;
    if EMPLOYEE_WORDS.contains(&first) {
        return Some((SizeField::Headcount, 1));
    }
    let connectors = tokens
        .iter()
        .take(2)
        .take_while(|t| REVENUE_CONNECTORS.contains(*t))
        .count();
    tokens
        .get(connectors)
        .filter(|t| REVENUE_WORDS.contains(*t))
        .map(|_| (SizeField::Revenue, connectors + 1))
}

/// Comparator used when the phrase carries no cue word.
fn default_comparator(field: SizeField) -> Comparator {
    match field {
        SizeField::Headcount => Comparator::Eq,
        SizeField::Revenue => Comparator::Lt,
    }
}

/// Amount plus an optional spelled-out unit ("5 million").
fn match_amount(tokens: &[&str]) -> Option<(Amount, usize)> {
    let mut amount = parse_amount(tokens.first()?)?;
    if !amount.scaled
        && let Some(mult) = tokens.get(1).and_then(|t| unit_multiplier(t))
        && (amount.value * mult).is_finite()
    {
        amount.value *= mult;
        amount.scaled = true;
        return Some((amount, 2));
    }
    Some((amount, 1))
}

/// Try to read a size phrase at the start of `tokens`.
///
/// Returns the constraints and the number of tokens the phrase spans.
fn match_size_phrase(tokens: &[&str]) -> Option<(Vec<SizeConstraint>, usize)> {
    let mut pos = 0;
    let mut field = None;
    if let Some((f, len)) = match_field_prefix(tokens) {
        field = Some(f);
        pos += len;
    }

    if tokens.get(pos) == Some(&"between") {
        return match_between(tokens, pos + 1, field);
    }

    let cue = match_cue(&tokens[pos..]);
    if let Some((_, len)) = cue {
        pos += len;
    }
    let (amount, len) = match_amount(&tokens[pos..])?;
    pos += len;

    if let Some((f, len)) = match_field_suffix(&tokens[pos..]) {
        field = field.or(Some(f));
        pos += len;
    }
    let field = field.or_else(|| amount.dollar.then_some(SizeField::Revenue))?;

    let comparator = cue
        .map(|(cmp, _)| cmp)
        .or_else(|| amount.plus.then_some(Comparator::Ge))
        .unwrap_or_else(|| default_comparator(field));

    Some((
        vec![SizeConstraint {
            field,
            comparator,
            value: amount.value,
        }],
        pos,
    ))
}

/// "between 10 and 50 employees" → `>= 10` and `<= 50`.
fn match_between(
    tokens: &[&str],
    mut pos: usize,
    field: Option<SizeField>,
) -> Option<(Vec<SizeConstraint>, usize)> {
    let (low, len) = match_amount(tokens.get(pos..)?)?;
    pos += len;
    if tokens.get(pos) != Some(&"and") {
        return None;
    }
    pos += 1;
    let (high, len) = match_amount(tokens.get(pos..)?)?;
    pos += len;

    let mut field = field;
    if let Some((f, len)) = match_field_suffix(&tokens[pos..]) {
        field = field.or(Some(f));
        pos += len;
    }
    let field = field.or_else(|| (low.dollar || high.dollar).then_some(SizeField::Revenue))?;

    Some((
        vec![
            SizeConstraint {
                field,
                comparator: Comparator::Ge,
                value: low.value,
            },
            SizeConstraint {
                field,
                comparator: Comparator::Le,
                value: high.value,
            },
        ],
        pos,
    ))
}
