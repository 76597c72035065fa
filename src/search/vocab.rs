//! Curated vocabularies for intent extraction.
//!
//! All tables are built once on first use and never mutated afterwards.
//! Keys are lower-cased phrases; multi-word phrases are matched on token
//! windows of up to [`MAX_PHRASE_TOKENS`] tokens.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Longest vocabulary phrase, in tokens.
pub const MAX_PHRASE_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    City,
    /// US state; carries the two-letter postal code.
    State(&'static str),
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationEntry {
    /// Display form stored on the intent ("Boston", "CA", "Canada").
    pub canonical: &'static str,
    pub kind: LocationKind,
}

const CITIES: &[&str] = &[
    "Atlanta",
    "Austin",
    "Baltimore",
    "Boston",
    "Boulder",
    "Cambridge",
    "Charlotte",
    "Chicago",
    "Cleveland",
    "Columbus",
    "Dallas",
    "Denver",
    "Detroit",
    "Houston",
    "Indianapolis",
    "Kansas City",
    "Las Vegas",
    "Los Angeles",
    "Miami",
    "Minneapolis",
    "Nashville",
    "New Orleans",
    "New York",
    "Oakland",
    "Orlando",
    "Palo Alto",
    "Philadelphia",
    "Phoenix",
    "Pittsburgh",
    "Portland",
    "Raleigh",
    "Sacramento",
    "Salt Lake City",
    "San Antonio",
    "San Diego",
    "San Francisco",
    "San Jose",
    "Seattle",
    "Tampa",
    "Toronto",
    "Vancouver",
    "London",
    "Berlin",
    "Paris",
];

const STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

const COUNTRIES: &[&str] = &[
    "USA",
    "United States",
    "Canada",
    "Mexico",
    "United Kingdom",
    "UK",
    "Germany",
    "France",
    "India",
    "Japan",
    "Australia",
    "Brazil",
];

/// State codes that are also everyday words; only accepted when typed upper-case.
pub const AMBIGUOUS_STATE_CODES: &[&str] = &[
    "al", "co", "de", "hi", "ia", "id", "in", "la", "ma", "me", "mo", "ne", "oh", "ok", "or", "pa",
];

/// Canonical industry names with their lower-case aliases.
const INDUSTRIES: &[(&str, &[&str])] = &[
    ("Software", &["software", "saas"]),
    ("Technology", &["technology", "tech"]),
    ("Retail", &["retail", "e-commerce", "ecommerce"]),
    ("Healthcare", &["healthcare", "health care", "medical"]),
    ("Biotechnology", &["biotechnology", "biotech"]),
    ("Financial Services", &["financial services", "finance", "fintech", "banking"]),
    ("Manufacturing", &["manufacturing"]),
    ("Education", &["education", "edtech"]),
    ("Real Estate", &["real estate", "proptech"]),
    ("Hospitality", &["hospitality"]),
    ("Food & Beverage", &["food and beverage", "food", "beverage", "restaurant"]),
    ("Energy", &["energy", "cleantech"]),
    ("Logistics", &["logistics", "shipping", "transportation"]),
    ("Media", &["media", "entertainment"]),
    ("Consulting", &["consulting"]),
    ("Marketing", &["marketing", "advertising"]),
    ("Telecommunications", &["telecommunications", "telecom"]),
    ("Construction", &["construction"]),
    ("Agriculture", &["agriculture", "agtech"]),
    ("Insurance", &["insurance", "insurtech"]),
];

const STOPWORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "based", "be", "by", "company",
    "companies", "business", "businesses", "firm", "firms", "for", "from", "find", "get", "give",
    "have", "has", "headquartered", "i", "in", "is", "it", "list", "located", "me", "my", "near",
    "of", "on", "or", "organization", "organizations", "please", "search", "show", "startup",
    "startups", "that", "the", "their", "them", "there", "these", "this", "those", "to", "want",
    "we", "which", "who", "with", "within", "work", "working",
];

// Cities are inserted last so "New York" resolves to the city, not the state.
static LOCATIONS: Lazy<HashMap<String, LocationEntry>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, code) in STATES {
        let entry = LocationEntry {
            canonical: *code,
            kind: LocationKind::State(*code),
        };
        map.insert(name.to_lowercase(), entry);
        map.insert(code.to_lowercase(), entry);
    }
    for country in COUNTRIES {
        map.insert(
            country.to_lowercase(),
            LocationEntry {
                canonical: *country,
                kind: LocationKind::Country,
            },
        );
    }
    for city in CITIES {
        map.insert(
            city.to_lowercase(),
            LocationEntry {
                canonical: *city,
                kind: LocationKind::City,
            },
        );
    }
    map
});

static INDUSTRY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    INDUSTRIES
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
});

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

static STATE_CODES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STATES.iter().map(|(_, code)| *code).collect());

/// Look up a lower-cased location phrase.
pub fn location(phrase: &str) -> Option<LocationEntry> {
    LOCATIONS.get(phrase).copied()
}

/// Look up a lower-cased industry phrase, tolerating a trailing plural `s`.
pub fn industry(phrase: &str) -> Option<&'static str> {
    INDUSTRY_ALIASES.get(phrase).copied().or_else(|| {
        phrase
            .strip_suffix('s')
            .and_then(|singular| INDUSTRY_ALIASES.get(singular).copied())
    })
}

/// Shortest alias [`industry_within`] will look for inside a token.
const MIN_EMBEDDED_ALIAS: usize = 4;

/// Single-word aliases, longest first, then alphabetical.
static EMBEDDED_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut aliases: Vec<(&'static str, &'static str)> = INDUSTRY_ALIASES
        .iter()
        .filter(|(alias, _)| alias.len() >= MIN_EMBEDDED_ALIAS && !alias.contains(' '))
        .map(|(alias, canonical)| (*alias, *canonical))
        .collect();
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    aliases
});

/// Industry whose alias appears inside a lower-cased token ("retailers",
/// "software-based"). The longest alias wins.
pub fn industry_within(token: &str) -> Option<&'static str> {
    EMBEDDED_ALIASES
        .iter()
        .find(|(alias, _)| token.contains(*alias))
        .map(|(_, canonical)| *canonical)
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

/// True for an upper-case two-letter US postal code ("MA", "TX").
pub fn is_state_code(token: &str) -> bool {
    STATE_CODES.contains(token)
}

pub fn is_ambiguous_state_code(lower: &str) -> bool {
    AMBIGUOUS_STATE_CODES.contains(&lower)
}
