use company_search::model::types::{COMPANY_COLUMNS, CompanyRecord};
use company_search::search::compile::{MAX_LIMIT, compile};
use company_search::search::intent::{extract, tokenize};
use company_search::search::predicate::build;
use company_search::search::rank::rank;
use proptest::prelude::*;

/// Words drawn from the vocabularies plus noise, so generated requests hit
/// every extraction path.
fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Boston".to_string()),
        Just("San".to_string()),
        Just("Francisco".to_string()),
        Just("CA".to_string()),
        Just("in".to_string()),
        Just("OR".to_string()),
        Just("software".to_string()),
        Just("tech".to_string()),
        Just("over".to_string()),
        Just("under".to_string()),
        Just("between".to_string()),
        Just("and".to_string()),
        Just("employees".to_string()),
        Just("revenue".to_string()),
        Just("$5M".to_string()),
        Just("20".to_string()),
        Just("100+".to_string()),
        Just("companies".to_string()),
        "[a-zA-Z]{1,8}",
        "[0-9]{1,4}",
        "\\$?[0-9]{300,400}[kmb]?",
        "[ -~]{1,6}",
    ]
}

fn request() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 0..12).prop_map(|words| words.join(" "))
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

fn company(id: i64, text: String) -> CompanyRecord {
    CompanyRecord {
        id,
        name: format!("c{id}"),
        description: Some(text),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn extraction_accounts_for_every_token(text in request()) {
        let intent = extract(&text);
        let mut seen: Vec<String> = intent.keywords.clone();
        seen.extend(intent.consumed_tokens.iter().cloned());
        let expected: Vec<String> = tokenize(&text).into_iter().map(|t| t.lower).collect();
        prop_assert_eq!(sorted(seen), sorted(expected));
    }

    #[test]
    fn keywords_are_unique(text in request()) {
        let intent = extract(&text);
        let mut deduped = intent.keywords.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), intent.keywords.len());
    }

    #[test]
    fn build_is_deterministic_and_whitelisted(text in request()) {
        let intent = extract(&text);
        let first = build(&intent).unwrap();
        let second = build(&intent).unwrap();
        prop_assert_eq!(&first, &second);
        for p in &first {
            prop_assert!(COMPANY_COLUMNS.contains(&p.column()));
        }
    }

    #[test]
    fn compiled_sql_has_one_limit_and_where_iff_predicates(text in request()) {
        let predicates = build(&extract(&text)).unwrap();
        let q = compile(&predicates).unwrap();
        let sql = q.sql_text();
        prop_assert_eq!(sql.matches(" LIMIT ").count(), 1);
        prop_assert!(q.limit() >= 1 && q.limit() <= MAX_LIMIT);
        prop_assert_eq!(sql.contains(" WHERE "), !predicates.is_empty());
        prop_assert_eq!(q.params().len(), predicates.len());
        prop_assert!(sql.starts_with("SELECT id, name, description"));
    }

    #[test]
    fn ranking_is_idempotent(
        texts in prop::collection::vec("[a-z ]{0,40}", 0..12),
        keywords in prop::collection::vec("[a-z]{1,4}", 0..4),
    ) {
        let rows: Vec<CompanyRecord> = texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| company(i as i64, t))
            .collect();
        let a = rank(rows.clone(), &keywords);
        let b = rank(rows, &keywords);
        prop_assert_eq!(&a, &b);
        for r in &a {
            prop_assert!((0.0..=1.0).contains(&r.score));
        }
        for pair in a.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].row.id < pair[1].row.id);
            }
        }
    }

    #[test]
    fn superset_of_keywords_never_scores_lower(
        filler in "[0-9 ]{0,20}",
        mask in prop::collection::vec(any::<bool>(), 3),
    ) {
        let vocab = ["alpha", "bravo", "charlie"];
        let keywords: Vec<String> = vocab.iter().map(|w| (*w).to_string()).collect();
        let subset: Vec<&str> = vocab
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(w, _)| *w)
            .collect();
        let rows = vec![
            company(0, format!("{} {filler}", subset.join(" "))),
            company(1, format!("{} {filler}", vocab.join(" "))),
        ];
        let ranked = rank(rows, &keywords);
        let score_of = |id: i64| ranked.iter().find(|r| r.row.id == id).map(|r| r.score).unwrap();
        prop_assert!(score_of(1) >= score_of(0));
    }
}
