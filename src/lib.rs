pub mod config;
pub mod model;
pub mod output;
pub mod search;
pub mod storage;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use config::SearchConfig;
use search::compile::QueryCompiler;
use search::query::CompanySearch;
use storage::sqlite::SqliteExecutor;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "company-search",
    version,
    about = "Natural-language search over a companies database"
)]
pub struct Cli {
    /// Path to the SQLite database (overrides config and COMPANY_SEARCH_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search and print ranked companies
    Search {
        /// Free-text request, e.g. "software companies in Boston with over 20 employees"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Override the row cap chosen by the limit heuristic
        #[arg(long)]
        limit: Option<usize>,

        /// Emit the full response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the extracted intent and compiled SQL without touching the database
    Explain {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, limit, json } => {
            let cfg = load_config(cli.config, cli.db)?;
            init_tracing(&cfg.log_level);
            run_search(&cfg, &query.join(" "), limit, json)
        }
        Commands::Explain { query, limit, json } => {
            let cfg = load_config(cli.config, cli.db)?;
            init_tracing(&cfg.log_level);
            run_explain(&cfg, &query.join(" "), limit, json)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "company-search", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

fn load_config(config: Option<PathBuf>, db_override: Option<PathBuf>) -> Result<SearchConfig> {
    let mut cfg = SearchConfig::load(config.as_deref()).context("loading configuration")?;
    if let Some(db) = db_override {
        cfg.db_path = db;
    }
    Ok(cfg)
}

fn run_search(cfg: &SearchConfig, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let executor = SqliteExecutor::open_readonly(&cfg.db_path, cfg.busy_timeout())
        .with_context(|| format!("opening {}", cfg.db_path.display()))?;
    let search = CompanySearch::with_compiler(executor, QueryCompiler::new(cfg.limit_policy()));

    let response = search
        .search_with_limit(query, limit)
        .map_err(|e| anyhow::anyhow!("[{}] {e}", e.kind()))?;

    if response.results.is_empty() && search.executor().company_count()? == 0 {
        warn!(
            path = ?search.executor().path(),
            "database has no companies; load data before searching"
        );
    }

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &response)?;
        println!();
    } else {
        output::write_response(&mut out, &response)?;
    }
    Ok(())
}

fn run_explain(cfg: &SearchConfig, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let compiler = QueryCompiler::new(cfg.limit_policy());
    let plan = search::query::plan(query, &compiler, limit)
        .map_err(|e| anyhow::anyhow!("[{}] {e}", e.kind()))?;

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &plan)?;
        println!();
    } else {
        output::write_plan(&mut out, &plan)?;
    }
    Ok(())
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `fallback`.
pub fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn default_db_path() -> PathBuf {
    default_data_dir().join("companies.db")
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "company-search", "company-search")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
