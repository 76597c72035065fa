//! Seed data for the `companies` table.

use rusqlite::{Connection, params};
use std::path::Path;

pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    industry TEXT,
    city TEXT,
    state TEXT,
    country TEXT,
    headcount INTEGER,
    revenue REAL,
    founded_year INTEGER,
    website TEXT
);
";

/// (name, description, industry, city, state, headcount, revenue)
pub const COMPANIES: &[(&str, &str, &str, &str, &str, i64, f64)] = &[
    ("Brewtab", "POS terminals and loyalty for coffee shops", "Software", "Boston", "MA", 45, 3_000_000.0),
    ("Ledgerly", "Cloud accounting for small businesses", "Software", "Boston", "MA", 120, 18_000_000.0),
    ("Harbor Analytics", "Data warehouse consulting", "Software", "Boston", "MA", 15, 1_200_000.0),
    ("Roastworks", "Specialty coffee roaster with wholesale POS integrations", "Food & Beverage", "Portland", "OR", 30, 4_500_000.0),
    ("Lone Star Retail", "Regional grocery chain", "Retail", "Austin", "TX", 900, 250_000_000.0),
    ("Bayside Bio", "Protein engineering platform", "Biotechnology", "Cambridge", "MA", 60, 9_000_000.0),
    ("Golden Gate Pay", "Payments API for marketplaces", "Financial Services", "San Francisco", "CA", 300, 75_000_000.0),
    ("Mission Coffee Tech", "Inventory software for coffee chains", "Software", "San Francisco", "CA", 22, 2_100_000.0),
];

pub fn seed(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    let mut stmt = conn.prepare(
        "INSERT INTO companies (id, name, description, industry, city, state, country, headcount, revenue, founded_year, website)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'USA', ?7, ?8, ?9, ?10)",
    )?;
    for (i, (name, description, industry, city, state, headcount, revenue)) in
        COMPANIES.iter().enumerate()
    {
        let id = i as i64 + 1;
        stmt.execute(params![
            id,
            name,
            description,
            industry,
            city,
            state,
            headcount,
            revenue,
            2000 + id,
            format!("{}.example", name.to_lowercase().replace(' ', "-")),
        ])?;
    }
    Ok(())
}

/// Create `path` and fill it with [`COMPANIES`].
pub fn seed_file(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(path)?;
    seed(&conn)
}
