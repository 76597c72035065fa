//! Human-readable rendering for the CLI. JSON output goes through serde directly.

use colored::Colorize;
use std::io::{self, Write};

use crate::search::query::{SearchPlan, SearchResponse};

pub fn write_response<W: Write>(out: &mut W, response: &SearchResponse) -> io::Result<()> {
    let meta = &response.metadata;
    writeln!(
        out,
        "{} {} (limit {})",
        meta.result_count.to_string().bold(),
        if meta.result_count == 1 { "match" } else { "matches" },
        meta.compiled_query.limit()
    )?;
    if !meta.predicates.is_empty() {
        let filters: Vec<String> = meta.predicates.iter().map(ToString::to_string).collect();
        writeln!(out, "{} {}", "filters:".dimmed(), filters.join(" AND "))?;
    }
    if !meta.intent.keywords.is_empty() {
        writeln!(
            out,
            "{} {}",
            "keywords:".dimmed(),
            meta.intent.keywords.join(", ")
        )?;
    }

    for (i, result) in response.results.iter().enumerate() {
        let row = &result.row;
        writeln!(
            out,
            "{:>3}. {} {} {}",
            i + 1,
            format!("[{:.3}]", result.score).cyan(),
            row.name.bold(),
            row.location_label()
        )?;
        let mut details = Vec::new();
        if let Some(industry) = &row.industry {
            details.push(industry.clone());
        }
        if let Some(headcount) = row.headcount {
            details.push(format!("{headcount} employees"));
        }
        if let Some(revenue) = row.revenue {
            details.push(format!("${}", human_amount(revenue)));
        }
        if !details.is_empty() {
            writeln!(out, "     {}", details.join(" | "))?;
        }
        if !result.matched_keywords.is_empty() {
            writeln!(
                out,
                "     {} {}",
                "matched:".dimmed(),
                result.matched_keywords.join(", ").green()
            )?;
        }
    }
    Ok(())
}

pub fn write_plan<W: Write>(out: &mut W, plan: &SearchPlan) -> io::Result<()> {
    let intent = &plan.intent;
    writeln!(out, "{}", "intent".bold())?;
    writeln!(out, "  locations:  {}", intent.locations.join(", "))?;
    writeln!(out, "  industries: {}", intent.industries.join(", "))?;
    for size in &intent.size_constraints {
        writeln!(
            out,
            "  size:       {} {} {}",
            size.field.column(),
            size.comparator,
            size.value
        )?;
    }
    writeln!(out, "  keywords:   {}", intent.keywords.join(", "))?;
    writeln!(out, "{}", "predicates".bold())?;
    for predicate in &plan.predicates {
        writeln!(out, "  {predicate}")?;
    }
    writeln!(out, "{}", "sql".bold())?;
    writeln!(out, "  {}", plan.compiled_query.inline_sql())?;
    writeln!(out, "  limit: {}", plan.compiled_query.limit())?;
    Ok(())
}

/// 1500 → "1.5K", 3_000_000 → "3M".
pub fn human_amount(value: f64) -> String {
    let (scaled, suffix) = if value.abs() >= 1e9 {
        (value / 1e9, "B")
    } else if value.abs() >= 1e6 {
        (value / 1e6, "M")
    } else if value.abs() >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    let text = format!("{scaled:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::compile::QueryCompiler;
    use crate::search::query::plan;

    #[test]
    fn human_amounts() {
        assert_eq!(human_amount(1500.0), "1.5K");
        assert_eq!(human_amount(3_000_000.0), "3M");
        assert_eq!(human_amount(2.5e9), "2.5B");
        assert_eq!(human_amount(12.0), "12");
    }

    #[test]
    fn plan_lists_predicates_and_sql() {
        colored::control::set_override(false);
        let plan = plan("retail in Denver", &QueryCompiler::default(), None).unwrap();
        let mut buf = Vec::new();
        write_plan(&mut buf, &plan).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("city LIKE '%Denver%'"));
        assert!(text.contains("industry LIKE '%Retail%'"));
        assert!(text.contains("limit: 16"));
    }
}
